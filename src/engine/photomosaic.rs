//! Built-in photomosaic engine
//!
//! Decodes the request images, fits master and tiles to the grid, applies
//! colour matching, assigns tiles with the requested solver and renders the
//! blueprint. Every failure is returned as an [`EngineError`].

use crate::engine::{Engine, EngineFactory, color, imaging, metrics, solvers};
use crate::io::error::EngineError;
use crate::protocol::{Blueprint, BuildRequest, EngineOutput};
use image::imageops::{self, FilterType};
use tracing::{debug, info};

/// Stateless engine backed by the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotomosaicEngine;

impl PhotomosaicEngine {
    /// Create an engine
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for PhotomosaicEngine {
    fn build(&mut self, request: &BuildRequest) -> Result<EngineOutput, EngineError> {
        let grid = request.grid();
        let grid_size = (grid.width, grid.height);

        let mut master = imaging::decode(request.master())?;
        if let Some((width, height)) = request.output_size() {
            if (width, height) != master.dimensions() {
                master = imageops::resize(&master, width, height, FilterType::Nearest);
            }
        }
        let master = imaging::fit_to_grid(master, grid_size)?;
        let cell_size = (master.width() / grid.width, master.height() / grid.height);
        debug!(
            request = %request.id(),
            width = master.width(),
            height = master.height(),
            cell_width = cell_size.0,
            cell_height = cell_size.1,
            "master fitted to grid"
        );

        let tiles = request
            .tiles()
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                imaging::decode(tile)
                    .and_then(|img| imaging::size_tile(&img, request.tile_sizing(), cell_size, index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (master, tiles) = color::apply(request.color_matching(), master, tiles);

        let cells = imaging::split_cells(&master, grid_size);
        let distances = metrics::distance_matrix(&cells, &tiles, request.metric());
        let assignments = solvers::solve(request.solver(), &distances, grid.tile_repeats)?;
        let blueprint = Blueprint::from_assignments(grid_size, cell_size, &assignments);

        let rendered = imaging::render(&blueprint, &tiles)?;
        let rendered_image = imaging::encode_png(&rendered)?;
        let tiles = tiles
            .iter()
            .map(imaging::encode_png)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            request = %request.id(),
            cells = blueprint.cells.len(),
            tiles = tiles.len(),
            solver = ?request.solver(),
            "mosaic built"
        );

        Ok(EngineOutput {
            blueprint,
            tiles,
            rendered_image,
        })
    }
}

/// Factory producing [`PhotomosaicEngine`] instances
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotomosaicFactory;

impl EngineFactory for PhotomosaicFactory {
    fn create(&self) -> Result<Box<dyn Engine>, EngineError> {
        Ok(Box::new(PhotomosaicEngine::new()))
    }
}
