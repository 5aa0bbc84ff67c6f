//! Background worker thread owning one engine instance
//!
//! The worker answers each request with a [`WorkerEvent::Reply`]. Anything that
//! breaks the worker itself (an engine panic, a failed engine initialization,
//! a closed channel) is reported as [`WorkerEvent::Fault`], after which the
//! handle must be thrown away.

use crate::engine::{Engine, EngineFactory};
use crate::io::configuration::WORKER_THREAD_NAME;
use crate::io::error::{MosaicError, Result};
use crate::protocol::{BuildRequest, EngineReply, WorkerEvent};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a spawned worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Numeric identity
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

enum WorkerCommand {
    Build(Box<BuildRequest>),
    Shutdown,
}

/// Exclusive handle to one worker thread and its channels
pub struct WorkerHandle {
    id: WorkerId,
    commands: Option<Sender<WorkerCommand>>,
    events: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("terminated", &self.is_terminated())
            .finish_non_exhaustive()
    }
}

impl WorkerHandle {
    /// Start a worker thread that creates its engine from `factory`
    ///
    /// Engine initialization happens on the worker thread; a failure there
    /// arrives later as a fault event rather than as an error here.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system refuses to spawn the thread
    pub fn spawn<F: EngineFactory>(factory: Arc<F>) -> Result<Self> {
        let id = WorkerId(NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed));
        let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();
        let (event_tx, event_rx) = mpsc::channel::<WorkerEvent>();

        let thread = thread::Builder::new()
            .name(format!("{WORKER_THREAD_NAME}-{}", id.get()))
            .spawn(move || run_worker(id, factory.as_ref(), &command_rx, &event_tx))
            .map_err(|source| MosaicError::WorkerSpawn { source })?;

        debug!(worker = %id, "worker spawned");
        Ok(Self {
            id,
            commands: Some(command_tx),
            events: event_rx,
            thread: Some(thread),
        })
    }

    /// Identity of this worker
    pub const fn id(&self) -> WorkerId {
        self.id
    }

    /// Whether [`Self::terminate`] has run
    pub const fn is_terminated(&self) -> bool {
        self.commands.is_none()
    }

    /// Hand a request to the worker
    ///
    /// # Errors
    ///
    /// Returns an error if the worker has exited or was terminated
    pub fn send(&self, request: BuildRequest) -> Result<()> {
        let commands = self
            .commands
            .as_ref()
            .ok_or(MosaicError::WorkerChannelClosed)?;
        commands
            .send(WorkerCommand::Build(Box::new(request)))
            .map_err(|_closed| MosaicError::WorkerChannelClosed)
    }

    /// Next pending event without blocking
    ///
    /// A worker that has gone away yields a fault.
    pub fn try_next_event(&self) -> Option<WorkerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(channel_closed()),
        }
    }

    /// Next event, waiting at most `timeout`
    pub fn next_event_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(channel_closed()),
        }
    }

    /// Stop the worker and release its channels
    ///
    /// A thread that has already exited is joined. A thread still inside the
    /// engine is detached; it exits as soon as it notices the closed channels.
    pub fn terminate(&mut self) {
        let Some(commands) = self.commands.take() else {
            return;
        };
        let _ = commands.send(WorkerCommand::Shutdown);
        drop(commands);

        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                if thread.join().is_err() {
                    warn!(worker = %self.id, "worker thread ended with a panic");
                }
            } else {
                debug!(worker = %self.id, "detaching busy worker thread");
            }
        }
        debug!(worker = %self.id, "worker terminated");
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn channel_closed() -> WorkerEvent {
    WorkerEvent::Fault {
        reason: "worker channel closed unexpectedly".to_string(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

fn run_worker<F: EngineFactory>(
    id: WorkerId,
    factory: &F,
    commands: &Receiver<WorkerCommand>,
    events: &Sender<WorkerEvent>,
) {
    let created = panic::catch_unwind(AssertUnwindSafe(|| factory.create()));
    let mut engine: Box<dyn Engine> = match created {
        Ok(Ok(engine)) => engine,
        Ok(Err(init_error)) => {
            error!(worker = %id, error = %init_error, "engine initialization failed");
            let _ = events.send(WorkerEvent::Fault {
                reason: init_error.to_string(),
            });
            return;
        }
        Err(payload) => {
            let reason = format!(
                "engine initialization panicked: {}",
                panic_message(payload.as_ref())
            );
            error!(worker = %id, "{reason}");
            let _ = events.send(WorkerEvent::Fault { reason });
            return;
        }
    };

    while let Ok(command) = commands.recv() {
        let request = match command {
            WorkerCommand::Build(request) => request,
            WorkerCommand::Shutdown => break,
        };
        let request_id = request.id();
        debug!(worker = %id, request = %request_id, "build started");

        let reply = match panic::catch_unwind(AssertUnwindSafe(|| engine.build(&request))) {
            Ok(Ok(output)) => EngineReply::Built(output),
            Ok(Err(engine_error)) => EngineReply::Error {
                message: engine_error.to_string(),
            },
            Err(payload) => {
                // Engine state after a panic cannot be trusted; stop serving
                let reason = format!("engine panicked: {}", panic_message(payload.as_ref()));
                error!(worker = %id, request = %request_id, "{reason}");
                let _ = events.send(WorkerEvent::Fault { reason });
                return;
            }
        };

        if events
            .send(WorkerEvent::Reply {
                request: request_id,
                reply,
            })
            .is_err()
        {
            break;
        }
    }
    debug!(worker = %id, "worker loop finished");
}
