//! Percentage layout of a blueprint for absolutely positioned rendering
//!
//! Cell boxes are expressed as percentages of the canvas so a front end can
//! place them inside a container of any size. With cropped tiles the canvas
//! keeps the blueprint's own pixel aspect and both axes share one scale. With
//! resized tiles the canvas takes the requested aspect and the axes scale
//! independently.

use crate::io::error::{MosaicError, Result};
use crate::protocol::{Blueprint, TileSizing};
use serde::Serialize;

/// One cell placed on the canvas, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedCell {
    /// Tile shown in this cell
    pub tile_index: usize,
    /// Distance from the left edge, percent of canvas width
    pub left: f64,
    /// Distance from the top edge, percent of canvas height
    pub top: f64,
    /// Percent of canvas width
    pub width: f64,
    /// Percent of canvas height
    pub height: f64,
}

/// Canvas shape and cell boxes for a blueprint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueprintLayout {
    /// Canvas width over height
    pub canvas_aspect: f64,
    /// Cell boxes in blueprint order
    pub cells: Vec<PlacedCell>,
}

/// Lay out every blueprint cell on a percentage canvas
///
/// `fit_aspect` is the width over height the canvas should take when tiles
/// were resized; it is ignored for cropped tiles.
///
/// # Errors
///
/// Returns an error if:
/// - The blueprint has a zero grid or cell dimension
/// - A cell lies outside the grid
pub fn layout_blueprint(
    blueprint: &Blueprint,
    tile_sizing: TileSizing,
    fit_aspect: Option<f64>,
) -> Result<BlueprintLayout> {
    let (pixel_width, pixel_height) = blueprint.pixel_size();
    if pixel_width == 0 || pixel_height == 0 {
        return Err(MosaicError::Layout {
            reason: format!(
                "empty canvas ({}x{} cells of {}x{} pixels)",
                blueprint.grid_width,
                blueprint.grid_height,
                blueprint.cell_width,
                blueprint.cell_height
            ),
        });
    }

    let pixel_aspect = f64::from(pixel_width) / f64::from(pixel_height);
    let horizontal = 100.0 / f64::from(pixel_width);
    let (canvas_aspect, vertical) = match tile_sizing {
        // Same factor as the width, corrected for the canvas being taller or wider
        TileSizing::Crop => (pixel_aspect, horizontal * pixel_aspect),
        TileSizing::Resize => (
            fit_aspect
                .filter(|aspect| aspect.is_finite() && *aspect > 0.0)
                .unwrap_or(pixel_aspect),
            100.0 / f64::from(pixel_height),
        ),
    };

    let cells = blueprint
        .cells
        .iter()
        .map(|cell| {
            if cell.x >= blueprint.grid_width || cell.y >= blueprint.grid_height {
                return Err(MosaicError::Layout {
                    reason: format!(
                        "cell ({}, {}) is outside the {}x{} grid",
                        cell.x, cell.y, blueprint.grid_width, blueprint.grid_height
                    ),
                });
            }
            let (x, y) = blueprint.cell_origin(cell);
            Ok(PlacedCell {
                tile_index: cell.tile_index,
                left: f64::from(x) * horizontal,
                top: f64::from(y) * vertical,
                width: f64::from(blueprint.cell_width) * horizontal,
                height: f64::from(blueprint.cell_height) * vertical,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BlueprintLayout {
        canvas_aspect,
        cells,
    })
}

/// Tile bytes for each blueprint cell, in cell order
///
/// # Errors
///
/// Returns an error if a cell references a tile outside `tiles`
pub fn resolve_tiles<'a>(blueprint: &Blueprint, tiles: &'a [Vec<u8>]) -> Result<Vec<&'a [u8]>> {
    blueprint
        .cells
        .iter()
        .map(|cell| {
            tiles
                .get(cell.tile_index)
                .map(Vec::as_slice)
                .ok_or_else(|| MosaicError::Layout {
                    reason: format!(
                        "cell ({}, {}) uses tile {} but only {} tiles were returned",
                        cell.x,
                        cell.y,
                        cell.tile_index,
                        tiles.len()
                    ),
                })
        })
        .collect()
}
