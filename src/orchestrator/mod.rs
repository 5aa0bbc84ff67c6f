//! Build orchestration and its observable state

/// Trigger validation, dispatch and worker recovery
pub mod builder;
/// Build phases and outcomes
pub mod result;
/// Selection plus orchestrator for one user session
pub mod session;

pub use builder::Orchestrator;
pub use result::{BuildFailure, BuildPhase, BuildResult, BuiltMosaic, FailureKind};
pub use session::MosaicSession;
