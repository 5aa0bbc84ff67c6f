//! Build phases and the settled outcome shown to the presentation layer

use crate::io::configuration::CRASH_RETRY_HINT;
use crate::protocol::{Blueprint, EngineOutput};

/// Where the orchestrator is in its build cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuildPhase {
    /// Ready for a trigger; also the state after a crash recovery
    #[default]
    Idle,
    /// Checking the selection before composing a request
    Validating,
    /// A request is with the worker
    Dispatched,
    /// The last build produced a mosaic
    Succeeded,
    /// The engine rejected the last build
    Failed,
}

impl BuildPhase {
    /// Whether a new build may be triggered from this phase
    pub const fn accepts_trigger(self) -> bool {
        !matches!(self, Self::Validating | Self::Dispatched)
    }
}

/// A completed mosaic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltMosaic {
    /// Tile placement produced by the engine
    pub blueprint: Blueprint,
    /// PNG-encoded mosaic
    pub rendered_image: Vec<u8>,
    /// PNG-encoded tiles indexed by the blueprint's tile indices
    pub resolved_tiles: Vec<Vec<u8>>,
}

impl From<EngineOutput> for BuiltMosaic {
    fn from(output: EngineOutput) -> Self {
        Self {
            blueprint: output.blueprint,
            rendered_image: output.rendered_image,
            resolved_tiles: output.tiles,
        }
    }
}

/// Which failure tier ended a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The engine reported an error; the worker was kept
    Engine,
    /// The worker boundary failed; the worker was replaced
    Crash,
}

/// Why a build did not produce a mosaic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// Failure tier
    pub kind: FailureKind,
    /// Engine message or crash description
    pub reason: String,
}

impl BuildFailure {
    /// Failure reported by the engine inside a well-formed reply
    pub fn engine(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Engine,
            reason: reason.into(),
        }
    }

    /// Failure of the worker boundary itself
    pub fn crash(reason: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Crash,
            reason: reason.into(),
        }
    }

    /// Message suitable for showing to the user
    ///
    /// Crashes get a generic message with a retry suggestion instead of the
    /// internal reason.
    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::Engine => format!("Error while building mosaic: {}", self.reason),
            FailureKind::Crash => CRASH_RETRY_HINT.to_string(),
        }
    }
}

/// Latest build outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    /// A request is in flight
    Pending,
    /// The mosaic was built
    Succeeded(BuiltMosaic),
    /// The build failed
    Failed(BuildFailure),
}

impl BuildResult {
    /// Whether the outcome is final
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// The built mosaic, if the build succeeded
    pub const fn mosaic(&self) -> Option<&BuiltMosaic> {
        match self {
            Self::Succeeded(mosaic) => Some(mosaic),
            _ => None,
        }
    }

    /// The failure, if the build failed
    pub const fn failure(&self) -> Option<&BuildFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
