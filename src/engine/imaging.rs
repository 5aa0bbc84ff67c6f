//! Decoding, cropping, cell extraction and rendering of RGB images

use crate::io::error::EngineError;
use crate::protocol::{Blueprint, TileSizing};
use crate::selection::ImageBytes;
use image::imageops::{self, FilterType};
use image::{GenericImage, GenericImageView, ImageFormat, RgbImage};
use std::io::Cursor;

/// Decode encoded bytes into an RGB buffer
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image
pub fn decode(image: &ImageBytes) -> Result<RgbImage, EngineError> {
    image::load_from_memory(&image.bytes)
        .map(|decoded| decoded.to_rgb8())
        .map_err(|e| EngineError::Decode {
            name: image.name.clone(),
            reason: e.to_string(),
        })
}

/// Encode an RGB buffer as PNG
///
/// # Errors
///
/// Returns an error if the PNG encoder fails
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, EngineError> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| EngineError::Encode {
            reason: e.to_string(),
        })?;
    Ok(buffer)
}

/// Crop to `width` x `height` around the image centre
pub fn crop_centered(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    let width = width.min(img.width());
    let height = height.min(img.height());
    imageops::crop_imm(
        img,
        (img.width() - width) / 2,
        (img.height() - height) / 2,
        width,
        height,
    )
    .to_image()
}

/// Scale to cover `width` x `height` keeping aspect ratio, then centre-crop
pub fn crop_cover(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    let img_aspect = img.width() as f32 / img.height().max(1) as f32;
    let target_aspect = width as f32 / height.max(1) as f32;

    // Scale by the axis that leaves the other one overflowing
    let (new_width, new_height) = if img_aspect > target_aspect {
        let scale = height as f32 / img.height().max(1) as f32;
        ((img.width() as f32 * scale).round() as u32, height)
    } else {
        let scale = width as f32 / img.width().max(1) as f32;
        (width, (img.height() as f32 * scale).round() as u32)
    };

    let resized = imageops::resize(
        img,
        new_width.max(width),
        new_height.max(height),
        FilterType::Nearest,
    );
    crop_centered(&resized, width, height)
}

/// Crop the master so its dimensions are an exact multiple of the grid
///
/// # Errors
///
/// Returns an error if the master has fewer pixels than grid cells on either axis
pub fn fit_to_grid(master: RgbImage, grid: (u32, u32)) -> Result<RgbImage, EngineError> {
    let (grid_width, grid_height) = grid;
    if grid_width == 0 || grid_height == 0 {
        return Err(EngineError::InvalidGrid {
            reason: format!("grid {grid_width}x{grid_height} has no cells"),
        });
    }

    let cell_width = master.width() / grid_width;
    let cell_height = master.height() / grid_height;
    if cell_width == 0 || cell_height == 0 {
        return Err(EngineError::InvalidGrid {
            reason: format!(
                "master image {}x{} is smaller than the {grid_width}x{grid_height} grid",
                master.width(),
                master.height()
            ),
        });
    }

    let fitted = (cell_width * grid_width, cell_height * grid_height);
    if fitted == master.dimensions() {
        Ok(master)
    } else {
        Ok(crop_centered(&master, fitted.0, fitted.1))
    }
}

/// Fit one tile to the cell size
///
/// # Errors
///
/// Returns an error in crop mode when the tile is smaller than the cell
pub fn size_tile(
    tile: &RgbImage,
    sizing: TileSizing,
    cell: (u32, u32),
    index: usize,
) -> Result<RgbImage, EngineError> {
    let (cell_width, cell_height) = cell;
    match sizing {
        TileSizing::Resize => Ok(imageops::resize(
            tile,
            cell_width,
            cell_height,
            FilterType::Nearest,
        )),
        TileSizing::Crop => {
            if cell_width > tile.width() || cell_height > tile.height() {
                return Err(EngineError::TileTooSmall {
                    index,
                    tile: tile.dimensions(),
                    cell,
                });
            }
            Ok(crop_cover(tile, cell_width, cell_height))
        }
    }
}

/// Split a grid-fitted master into cell images in row-major order
pub fn split_cells(master: &RgbImage, grid: (u32, u32)) -> Vec<RgbImage> {
    let (grid_width, grid_height) = grid;
    let cell_width = master.width() / grid_width.max(1);
    let cell_height = master.height() / grid_height.max(1);

    (0..grid_height)
        .flat_map(|y| {
            (0..grid_width).map(move |x| {
                master
                    .view(x * cell_width, y * cell_height, cell_width, cell_height)
                    .to_image()
            })
        })
        .collect()
}

/// Paint every cell's tile into a new mosaic image
///
/// # Errors
///
/// Returns an error if:
/// - A cell references a tile outside `tiles`
/// - A tile does not fit at its cell position
pub fn render(blueprint: &Blueprint, tiles: &[RgbImage]) -> Result<RgbImage, EngineError> {
    let (width, height) = blueprint.pixel_size();
    let mut mosaic = RgbImage::new(width, height);

    for cell in &blueprint.cells {
        let tile = tiles
            .get(cell.tile_index)
            .ok_or(EngineError::InvalidTileIndex {
                index: cell.tile_index,
                tiles: tiles.len(),
            })?;
        let (x, y) = blueprint.cell_origin(cell);
        mosaic
            .copy_from(tile, x, y)
            .map_err(|e| EngineError::TilePlacement {
                x: cell.x,
                y: cell.y,
                reason: e.to_string(),
            })?;
    }

    Ok(mosaic)
}
