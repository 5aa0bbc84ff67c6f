//! User images and the selection they form

/// Revocable in-memory image handles
pub mod images;
/// Selection state and its transitions
pub mod state;

pub use images::{ImageBytes, ImageHandle, ImageStore, UserImage};
pub use state::SelectionState;
