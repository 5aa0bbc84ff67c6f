//! Read-only views over settled build results

/// Percentage layout of blueprint cells
pub mod layout;

pub use layout::{BlueprintLayout, PlacedCell, layout_blueprint, resolve_tiles};
