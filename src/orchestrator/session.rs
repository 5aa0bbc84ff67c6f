//! Selection and orchestrator bundled as the surface a front end drives

use crate::engine::EngineFactory;
use crate::geometry::{GridConfig, OutputSizing};
use crate::io::error::{BuildError, Result};
use crate::orchestrator::builder::Orchestrator;
use crate::orchestrator::result::{BuildPhase, BuildResult};
use crate::protocol::RequestId;
use crate::selection::SelectionState;
use std::time::Duration;
use tracing::debug;

/// One user session: the selection being edited and the build it feeds
///
/// Ending the session revokes every image handle and stops the worker.
#[derive(Debug)]
pub struct MosaicSession<F: EngineFactory> {
    selection: SelectionState,
    orchestrator: Orchestrator<F>,
    ended: bool,
}

impl<F: EngineFactory> MosaicSession<F> {
    /// Start a session with an empty selection
    ///
    /// # Errors
    ///
    /// Returns an error if the first worker cannot be spawned
    pub fn new(factory: F) -> Result<Self> {
        Ok(Self {
            selection: SelectionState::new(),
            orchestrator: Orchestrator::new(factory)?,
            ended: false,
        })
    }

    /// Current selection
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Selection mutators
    pub const fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// Orchestrator driving the builds
    pub const fn orchestrator(&self) -> &Orchestrator<F> {
        &self.orchestrator
    }

    /// Validate the current selection and dispatch a build
    ///
    /// # Errors
    ///
    /// Returns the refusal reported by [`Orchestrator::trigger_build`]
    pub fn trigger_build(&mut self) -> std::result::Result<RequestId, BuildError> {
        self.orchestrator.trigger_build(&self.selection)
    }

    /// Apply pending worker events without blocking
    pub fn poll(&mut self) -> usize {
        self.orchestrator.poll()
    }

    /// Wait up to `timeout` for the next worker event
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        self.orchestrator.wait_for_event(timeout)
    }

    /// Whether a build is outstanding
    pub const fn is_building(&self) -> bool {
        self.orchestrator.is_building()
    }

    /// Current build phase
    pub const fn phase(&self) -> BuildPhase {
        self.orchestrator.phase()
    }

    /// Latest build outcome
    pub const fn result(&self) -> Option<&BuildResult> {
        self.orchestrator.result()
    }

    /// Configured grid
    pub const fn grid(&self) -> GridConfig {
        self.selection.grid()
    }

    /// Configured output sizing
    pub const fn output_sizing(&self) -> OutputSizing {
        self.selection.output_sizing()
    }

    /// Revoke every image and stop the worker
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.selection.end_session();
        self.orchestrator.shutdown();
        self.ended = true;
        debug!("session ended");
    }
}

impl<F: EngineFactory> Drop for MosaicSession<F> {
    fn drop(&mut self) {
        self.end();
    }
}
