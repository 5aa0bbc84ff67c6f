//! Build request snapshot and the engine option enums it carries

use crate::geometry::GridConfig;
use crate::io::error::BuildError;
use crate::selection::SelectionState;
use crate::selection::images::{ImageBytes, UserImage};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How tiles are fitted to the grid cell size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum TileSizing {
    /// Scale to cover the cell, then centre-crop
    #[default]
    Crop,
    /// Stretch to the cell size, ignoring aspect ratio
    Resize,
}

/// Colour transfer applied before tiles are matched to cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum ColorMatching {
    /// Leave colours untouched
    #[default]
    None,
    /// Histogram-equalize master and tiles
    Equalize,
    /// Move the tile palette towards the master
    MasterToTile,
    /// Move the master palette towards the tiles
    TileToMaster,
}

/// Tile-to-cell assignment strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Solver {
    /// Minimum total distance assignment
    #[default]
    Optimal,
    /// Closest pairs first
    Greedy,
    /// Auction bidding with a fixed epsilon
    Auction,
}

/// Distance between a grid cell and a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    /// Sum of absolute channel differences
    #[default]
    NormL1,
    /// Sum of squared channel differences
    NormL2,
    /// Sum of absolute luminance differences
    LuminanceL1,
    /// Root of summed squared luminance differences
    LuminanceL2,
    /// Difference of average colours
    AvgColor,
}

/// Identity of one build request, increasing per orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Immutable snapshot of everything the engine needs for one build
///
/// Image bytes are copied out of the store when the snapshot is taken, so
/// later selection changes or revocations do not reach an in-flight request.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    id: RequestId,
    master: ImageBytes,
    tiles: Vec<ImageBytes>,
    grid: GridConfig,
    tile_sizing: TileSizing,
    color_matching: ColorMatching,
    solver: Solver,
    metric: Metric,
    output_size: Option<(u32, u32)>,
}

impl BuildRequest {
    /// Snapshot the current selection
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No master image is selected
    /// - A selected image no longer resolves in the store
    pub fn snapshot(id: RequestId, selection: &SelectionState) -> Result<Self, BuildError> {
        let master_image = selection
            .master_image()
            .ok_or(BuildError::MissingMasterImage)?;
        let master = resolve(selection, master_image)?;
        let tiles = selection
            .tile_images()
            .iter()
            .map(|tile| resolve(selection, tile))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            master,
            tiles,
            grid: selection.grid(),
            tile_sizing: selection.tile_sizing(),
            color_matching: selection.color_matching(),
            solver: selection.solver(),
            metric: selection.metric(),
            output_size: selection.output_sizing().output_size(),
        })
    }

    /// Request identity
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Encoded master image
    pub const fn master(&self) -> &ImageBytes {
        &self.master
    }

    /// Encoded tile images, in pool order
    pub fn tiles(&self) -> &[ImageBytes] {
        &self.tiles
    }

    /// Grid shape and repeat limit
    pub const fn grid(&self) -> GridConfig {
        self.grid
    }

    /// Tile sizing mode
    pub const fn tile_sizing(&self) -> TileSizing {
        self.tile_sizing
    }

    /// Colour matching mode
    pub const fn color_matching(&self) -> ColorMatching {
        self.color_matching
    }

    /// Assignment solver
    pub const fn solver(&self) -> Solver {
        self.solver
    }

    /// Cell-to-tile distance metric
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Explicit output pixel size, if the master size was known
    pub const fn output_size(&self) -> Option<(u32, u32)> {
        self.output_size
    }
}

fn resolve(selection: &SelectionState, image: &UserImage) -> Result<ImageBytes, BuildError> {
    selection
        .store()
        .resolve(image)
        .ok_or_else(|| BuildError::RevokedImage {
            name: image.name().to_string(),
        })
}
