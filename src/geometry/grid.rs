//! Grid dimension arithmetic under the master aspect-ratio lock
//!
//! Everything here is a pure function of its inputs. Selection state calls
//! these from named transitions rather than recomputing on every change.

use crate::io::configuration::{
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_TILE_REPEATS, DEFAULT_UPSCALE,
    MAX_UPSCALE, MIN_GRID_DIMENSION, MIN_UPSCALE,
};
use serde::{Deserialize, Serialize};

/// Clamp a user supplied grid dimension to the allowed minimum
pub const fn clamp_dimension(value: u32) -> u32 {
    if value < MIN_GRID_DIMENSION {
        MIN_GRID_DIMENSION
    } else {
        value
    }
}

/// Width over height of a pixel size, `None` when either side is zero
pub fn aspect_ratio(width: u32, height: u32) -> Option<f64> {
    (width > 0 && height > 0).then(|| f64::from(width) / f64::from(height))
}

/// Grid height that keeps the master aspect ratio for the given width
///
/// `round(width / ratio)`, clamped to the minimum grid dimension.
pub fn locked_height(width: u32, master_aspect_ratio: f64) -> u32 {
    clamp_dimension(to_dimension(f64::from(width) / master_aspect_ratio))
}

/// Grid width that keeps the master aspect ratio for the given height
pub fn locked_width(height: u32, master_aspect_ratio: f64) -> u32 {
    clamp_dimension(to_dimension(f64::from(height) * master_aspect_ratio))
}

/// Minimum tile pool size: `ceil(width * height / tile_repeats)`
///
/// A repeat factor of zero is treated as one.
pub const fn required_tile_count(width: u32, height: u32, tile_repeats: usize) -> usize {
    let cells = width as usize * height as usize;
    let repeats = if tile_repeats == 0 { 1 } else { tile_repeats };
    cells.div_ceil(repeats)
}

// Non-finite or negative values collapse to zero so clamping handles them
fn to_dimension(value: f64) -> u32 {
    let rounded = value.round();
    if rounded.is_finite() && rounded > 0.0 {
        rounded.min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Grid shape and tile reuse limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of grid columns
    pub width: u32,
    /// Number of grid rows
    pub height: u32,
    /// Maximum number of cells a single tile may fill
    pub tile_repeats: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            tile_repeats: DEFAULT_TILE_REPEATS,
        }
    }
}

impl GridConfig {
    /// Create a grid config, clamping each value to its minimum
    pub const fn new(width: u32, height: u32, tile_repeats: usize) -> Self {
        Self {
            width: clamp_dimension(width),
            height: clamp_dimension(height),
            tile_repeats: if tile_repeats == 0 { 1 } else { tile_repeats },
        }
    }

    /// Total number of grid cells
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Minimum tile pool size for this grid
    pub const fn required_tiles(&self) -> usize {
        required_tile_count(self.width, self.height, self.tile_repeats)
    }
}

/// Output pixel size derived from the loaded master image
///
/// `base_size` stays `None` until the master image has been decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSizing {
    upscale: u32,
    base_size: Option<(u32, u32)>,
}

impl Default for OutputSizing {
    fn default() -> Self {
        Self::new(DEFAULT_UPSCALE)
    }
}

impl OutputSizing {
    /// Create a sizing with no known base size
    pub const fn new(upscale: u32) -> Self {
        Self {
            upscale: clamp_upscale(upscale),
            base_size: None,
        }
    }

    /// Current upscale factor
    pub const fn upscale(&self) -> u32 {
        self.upscale
    }

    /// Natural pixel size of the master image, once known
    pub const fn base_size(&self) -> Option<(u32, u32)> {
        self.base_size
    }

    /// Change the upscale factor, clamped to the supported range
    pub const fn set_upscale(&mut self, upscale: u32) {
        self.upscale = clamp_upscale(upscale);
    }

    /// Record the master image's natural pixel size
    pub const fn set_base_size(&mut self, size: (u32, u32)) {
        self.base_size = Some(size);
    }

    /// Forget the base size when the master image goes away
    pub const fn clear_base_size(&mut self) {
        self.base_size = None;
    }

    /// `base_size * upscale`, or `None` while the master is still loading
    pub const fn output_size(&self) -> Option<(u32, u32)> {
        match self.base_size {
            Some((width, height)) => Some((
                width.saturating_mul(self.upscale),
                height.saturating_mul(self.upscale),
            )),
            None => None,
        }
    }

    /// Width over height of the output, once known
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.base_size
            .and_then(|(width, height)| aspect_ratio(width, height))
    }
}

const fn clamp_upscale(upscale: u32) -> u32 {
    if upscale < MIN_UPSCALE {
        MIN_UPSCALE
    } else if upscale > MAX_UPSCALE {
        MAX_UPSCALE
    } else {
        upscale
    }
}
