//! Background worker lifecycle

/// Worker thread, its channels and crash containment
pub mod handle;

pub use handle::{WorkerHandle, WorkerId};
