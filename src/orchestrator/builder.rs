//! Build orchestration over a single replaceable worker
//!
//! The orchestrator validates a trigger, snapshots the selection into a
//! request, hands it to its worker and folds the worker's events back into
//! [`BuildPhase`] and [`BuildResult`]. Engine errors keep the worker; any
//! structural fault tears it down and starts a fresh one before returning to
//! [`BuildPhase::Idle`].

use crate::engine::EngineFactory;
use crate::io::error::{BuildError, MosaicError, Result};
use crate::orchestrator::result::{BuildFailure, BuildPhase, BuildResult};
use crate::protocol::{BuildRequest, EngineReply, RequestId, WorkerEvent};
use crate::selection::SelectionState;
use crate::worker::{WorkerHandle, WorkerId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Owns the worker and the state of the current build
#[derive(Debug)]
pub struct Orchestrator<F: EngineFactory> {
    factory: Arc<F>,
    worker: Option<WorkerHandle>,
    phase: BuildPhase,
    result: Option<BuildResult>,
    in_flight: Option<RequestId>,
    next_request: u64,
    replacements: usize,
}

impl<F: EngineFactory> Orchestrator<F> {
    /// Create an orchestrator and spawn its first worker
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned
    pub fn new(factory: F) -> Result<Self> {
        let factory = Arc::new(factory);
        let worker = WorkerHandle::spawn(Arc::clone(&factory))?;
        info!(worker = %worker.id(), "orchestrator ready");

        Ok(Self {
            factory,
            worker: Some(worker),
            phase: BuildPhase::Idle,
            result: None,
            in_flight: None,
            next_request: 1,
            replacements: 0,
        })
    }

    /// Current phase of the build cycle
    pub const fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Whether a request is outstanding
    pub const fn is_building(&self) -> bool {
        matches!(self.phase, BuildPhase::Dispatched)
    }

    /// Latest build outcome, `None` before the first trigger
    pub const fn result(&self) -> Option<&BuildResult> {
        self.result.as_ref()
    }

    /// Identity of the live worker, if one is running
    pub fn worker_id(&self) -> Option<WorkerId> {
        self.worker.as_ref().map(WorkerHandle::id)
    }

    /// Number of workers replaced after faults
    pub const fn replacements(&self) -> usize {
        self.replacements
    }

    /// Request currently with the worker
    pub const fn in_flight(&self) -> Option<RequestId> {
        self.in_flight
    }

    /// Validate the selection and dispatch a build
    ///
    /// Returns as soon as the request is handed to the worker; observe
    /// [`Self::is_building`] and [`Self::result`] to learn the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the build state unchanged, if:
    /// - A build is already outstanding
    /// - No master image is selected
    /// - The tile pool is smaller than the grid requires
    /// - A selected image was revoked
    /// - No worker is running and a new one cannot be spawned
    pub fn trigger_build(
        &mut self,
        selection: &SelectionState,
    ) -> std::result::Result<RequestId, BuildError> {
        if !self.phase.accepts_trigger() {
            debug!(request = ?self.in_flight, "build trigger ignored while busy");
            return Err(BuildError::Busy);
        }

        // A fault reported while idle replaces the worker before dispatch
        self.poll();

        let previous = self.phase;
        self.phase = BuildPhase::Validating;
        let request = match self.validate(selection).and_then(|request| {
            self.ensure_worker()?;
            Ok(request)
        }) {
            Ok(request) => request,
            Err(refusal) => {
                debug!(reason = %refusal, "build trigger refused");
                self.phase = previous;
                return Err(refusal);
            }
        };

        let id = request.id();
        self.next_request += 1;
        self.phase = BuildPhase::Dispatched;
        self.result = Some(BuildResult::Pending);
        self.in_flight = Some(id);

        let sent = self
            .worker
            .as_ref()
            .map_or(Err(MosaicError::WorkerChannelClosed), |worker| {
                worker.send(request)
            });
        match sent {
            Ok(()) => info!(request = %id, worker = ?self.worker_id(), "build dispatched"),
            Err(send_error) => self.recover_from_fault(&send_error.to_string()),
        }
        Ok(id)
    }

    /// Apply every event the worker has produced so far without blocking
    ///
    /// Returns the number of events applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(event) = self.worker.as_ref().and_then(WorkerHandle::try_next_event) {
            applied += 1;
            let fault = matches!(event, WorkerEvent::Fault { .. });
            self.apply(event);
            if fault {
                // The replacement gets its own chance on the next poll
                break;
            }
        }
        applied
    }

    /// Wait up to `timeout` for a worker event and apply it
    ///
    /// Returns `true` if an event was applied.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        let Some(event) = self
            .worker
            .as_ref()
            .and_then(|worker| worker.next_event_timeout(timeout))
        else {
            return false;
        };
        self.apply(event);
        true
    }

    /// Terminate the worker and drop any outstanding request
    pub fn shutdown(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
            info!(worker = %worker.id(), "orchestrator shut down");
        }
        self.in_flight = None;
        if self.phase == BuildPhase::Dispatched {
            self.phase = BuildPhase::Idle;
        }
    }

    fn validate(
        &self,
        selection: &SelectionState,
    ) -> std::result::Result<BuildRequest, BuildError> {
        if selection.master_image().is_none() {
            return Err(BuildError::MissingMasterImage);
        }

        let required = selection.required_tiles();
        let have = selection.tile_images().len();
        if have < required {
            return Err(BuildError::InsufficientTiles { required, have });
        }

        BuildRequest::snapshot(RequestId(self.next_request), selection)
    }

    fn ensure_worker(&mut self) -> std::result::Result<(), BuildError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let worker = WorkerHandle::spawn(Arc::clone(&self.factory)).map_err(|spawn_error| {
            BuildError::WorkerUnavailable {
                reason: spawn_error.to_string(),
            }
        })?;
        info!(worker = %worker.id(), "worker started on demand");
        self.worker = Some(worker);
        Ok(())
    }

    fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Reply { request, reply } => {
                if self.in_flight != Some(request) {
                    warn!(
                        request = %request,
                        expected = ?self.in_flight,
                        "dropping unexpected reply"
                    );
                    return;
                }
                self.in_flight = None;
                match reply {
                    EngineReply::Built(output) => {
                        info!(
                            request = %request,
                            cells = output.blueprint.cells.len(),
                            "build succeeded"
                        );
                        self.settle(BuildPhase::Succeeded, BuildResult::Succeeded(output.into()));
                    }
                    EngineReply::Error { message } => {
                        warn!(request = %request, %message, "engine reported an error");
                        self.settle(
                            BuildPhase::Failed,
                            BuildResult::Failed(BuildFailure::engine(message)),
                        );
                    }
                }
            }
            WorkerEvent::Fault { reason } => self.recover_from_fault(&reason),
        }
    }

    fn settle(&mut self, phase: BuildPhase, result: BuildResult) {
        self.phase = phase;
        self.result = Some(result);
    }

    fn recover_from_fault(&mut self, reason: &str) {
        let interrupted = self.in_flight.take().is_some();

        if let Some(mut faulty) = self.worker.take() {
            error!(worker = %faulty.id(), reason, "worker fault, replacing worker");
            faulty.terminate();
        }

        match WorkerHandle::spawn(Arc::clone(&self.factory)) {
            Ok(worker) => {
                info!(worker = %worker.id(), "replacement worker started");
                self.worker = Some(worker);
                self.replacements += 1;
            }
            Err(spawn_error) => {
                error!(error = %spawn_error, "replacement worker could not be started");
            }
        }

        self.phase = BuildPhase::Idle;
        if interrupted {
            self.result = Some(BuildResult::Failed(BuildFailure::crash(reason)));
        }
    }
}
