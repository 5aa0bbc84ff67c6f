//! Blueprint data and the messages a worker sends back

use crate::protocol::request::RequestId;
use serde::{Deserialize, Serialize};

/// One grid cell and the tile placed in it
///
/// `x` and `y` are grid-cell coordinates, not pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Index into the resolved tile list
    pub tile_index: usize,
    /// Column of the cell
    pub x: u32,
    /// Row of the cell
    pub y: u32,
}

/// Geometric tile-to-cell assignment, independent of rendered pixels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Cells in row-major order
    pub cells: Vec<Cell>,
    /// Cell width in pixels
    pub cell_width: u32,
    /// Cell height in pixels
    pub cell_height: u32,
    /// Number of grid columns
    pub grid_width: u32,
    /// Number of grid rows
    pub grid_height: u32,
}

impl Blueprint {
    /// Build a blueprint from one tile index per cell in row-major order
    pub fn from_assignments(
        grid: (u32, u32),
        cell_size: (u32, u32),
        assignments: &[usize],
    ) -> Self {
        let (grid_width, grid_height) = grid;
        let columns = grid_width.max(1) as usize;
        let cells = assignments
            .iter()
            .enumerate()
            .map(|(index, &tile_index)| Cell {
                tile_index,
                x: (index % columns) as u32,
                y: (index / columns) as u32,
            })
            .collect();

        Self {
            cells,
            cell_width: cell_size.0,
            cell_height: cell_size.1,
            grid_width,
            grid_height,
        }
    }

    /// Total pixel size of the rendered mosaic
    pub const fn pixel_size(&self) -> (u32, u32) {
        (
            self.grid_width.saturating_mul(self.cell_width),
            self.grid_height.saturating_mul(self.cell_height),
        )
    }

    /// Pixel offset of a cell's top-left corner
    pub const fn cell_origin(&self, cell: &Cell) -> (u32, u32) {
        (
            cell.x.saturating_mul(self.cell_width),
            cell.y.saturating_mul(self.cell_height),
        )
    }

    /// Largest tile index referenced by any cell
    pub fn max_tile_index(&self) -> Option<usize> {
        self.cells.iter().map(|cell| cell.tile_index).max()
    }
}

/// Successful engine output for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    /// Tile placement
    pub blueprint: Blueprint,
    /// PNG-encoded tiles as used in the mosaic, indexed like the blueprint
    pub tiles: Vec<Vec<u8>>,
    /// PNG-encoded full mosaic
    pub rendered_image: Vec<u8>,
}

/// Well-formed reply to a request
///
/// An `Error` reply means the engine rejected this request but remains usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineReply {
    /// The mosaic was built
    Built(EngineOutput),
    /// The engine reported an application-level error
    Error {
        /// Human readable reason
        message: String,
    },
}

/// Everything a worker can send across the boundary
///
/// `Fault` is reserved for structural failures of the worker itself and is
/// never produced for a request the engine merely rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Reply to a specific request
    Reply {
        /// Request the reply belongs to
        request: RequestId,
        /// The engine's reply
        reply: EngineReply,
    },
    /// The worker crashed, failed to initialize or lost its channel
    Fault {
        /// Description of the failure
        reason: String,
    },
}
