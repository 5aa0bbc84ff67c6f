//! Messages crossing the worker boundary

/// Request snapshot and engine option enums
pub mod request;
/// Blueprint and worker reply types
pub mod response;

pub use request::{BuildRequest, ColorMatching, Metric, RequestId, Solver, TileSizing};
pub use response::{Blueprint, Cell, EngineOutput, EngineReply, WorkerEvent};
