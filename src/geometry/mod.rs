//! Grid geometry and output sizing

/// Aspect-lock arithmetic, required tile counts and output sizing
pub mod grid;

pub use grid::{GridConfig, OutputSizing};
