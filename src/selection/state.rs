//! User selection: master image, tile pool and build options
//!
//! Each mutator is a named transition for one user action. Derived values
//! (locked grid height, output size) are recomputed inside the transition
//! that changes their inputs, never by watching fields.

use crate::geometry::grid::{aspect_ratio, clamp_dimension, locked_height, locked_width};
use crate::geometry::{GridConfig, OutputSizing};
use crate::protocol::{ColorMatching, Metric, Solver, TileSizing};
use crate::selection::images::{ImageStore, UserImage};
use std::sync::Arc;
use tracing::debug;

/// Everything the user has picked or configured for the next build
#[derive(Debug, Default)]
pub struct SelectionState {
    store: ImageStore,
    master: Option<UserImage>,
    master_aspect: Option<f64>,
    tiles: Vec<UserImage>,
    grid: GridConfig,
    aspect_locked: bool,
    sizing: OutputSizing,
    tile_sizing: TileSizing,
    color_matching: ColorMatching,
    solver: Solver,
    metric: Metric,
}

impl SelectionState {
    /// Create an empty selection with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a master image, revoking the previous one
    ///
    /// The aspect ratio is unknown until [`Self::master_image_loaded`] runs, so
    /// the aspect lock is released until then.
    pub fn set_master_image(
        &mut self,
        name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> UserImage {
        self.release_master();
        let image = self.store.register(name, bytes);
        debug!(image = %image.handle(), name = image.name(), "master image selected");
        self.master = Some(image.clone());
        image
    }

    /// Record the decoded natural size of the master image
    ///
    /// Returns `false` and changes nothing when `image` is no longer the
    /// selected master, which happens when a slow decode finishes after the
    /// user picked another image.
    pub fn master_image_loaded(&mut self, image: &UserImage, natural_size: (u32, u32)) -> bool {
        if self.master.as_ref() != Some(image) {
            debug!(image = %image.handle(), "ignoring size of a stale master image");
            return false;
        }

        self.sizing.set_base_size(natural_size);
        self.master_aspect = aspect_ratio(natural_size.0, natural_size.1);
        if self.aspect_locked {
            self.apply_locked_height();
        }
        true
    }

    /// Remove the master image and everything derived from it
    pub fn clear_master_image(&mut self) {
        self.release_master();
    }

    /// Append tiles in the given order; duplicate names are kept
    pub fn add_tile_images<I, N, B>(&mut self, files: I) -> Vec<UserImage>
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: Into<Arc<[u8]>>,
    {
        let added: Vec<UserImage> = files
            .into_iter()
            .map(|(name, bytes)| self.store.register(name, bytes))
            .collect();
        self.tiles.extend(added.iter().cloned());
        debug!(added = added.len(), total = self.tiles.len(), "tile images added");
        added
    }

    /// Remove and revoke the tile at `index`
    pub fn remove_tile_image(&mut self, index: usize) -> Option<UserImage> {
        if index >= self.tiles.len() {
            return None;
        }
        let removed = self.tiles.remove(index);
        self.store.revoke(&removed);
        Some(removed)
    }

    /// Remove and revoke every tile
    pub fn clear_tile_images(&mut self) {
        for tile in self.tiles.drain(..) {
            self.store.revoke(&tile);
        }
    }

    /// Set the number of grid columns
    ///
    /// With the aspect lock active the height follows the new width.
    pub fn set_grid_width(&mut self, width: u32) {
        self.grid.width = clamp_dimension(width);
        if self.aspect_locked {
            self.apply_locked_height();
        }
    }

    /// Set the number of grid rows
    ///
    /// With the aspect lock active the width follows the new height.
    pub fn set_grid_height(&mut self, height: u32) {
        self.grid.height = clamp_dimension(height);
        if let (true, Some(ratio)) = (self.aspect_locked, self.master_aspect) {
            self.grid.width = locked_width(self.grid.height, ratio);
        }
    }

    /// Enable or disable the aspect lock, returning the resulting state
    ///
    /// Enabling only succeeds once a master image has finished loading;
    /// otherwise the lock is forced off.
    pub fn set_aspect_lock(&mut self, enabled: bool) -> bool {
        self.aspect_locked = enabled && self.master_aspect.is_some();
        if self.aspect_locked {
            self.apply_locked_height();
        } else if enabled {
            debug!("aspect lock needs a loaded master image");
        }
        self.aspect_locked
    }

    /// Set the maximum uses of a single tile, at least one
    pub const fn set_tile_repeats(&mut self, tile_repeats: usize) {
        self.grid.tile_repeats = if tile_repeats == 0 { 1 } else { tile_repeats };
    }

    /// Set the output upscale factor, clamped to the supported range
    pub const fn set_upscale(&mut self, upscale: u32) {
        self.sizing.set_upscale(upscale);
    }

    /// Set the tile sizing mode
    pub const fn set_tile_sizing(&mut self, tile_sizing: TileSizing) {
        self.tile_sizing = tile_sizing;
    }

    /// Set the colour matching mode
    pub const fn set_color_matching(&mut self, color_matching: ColorMatching) {
        self.color_matching = color_matching;
    }

    /// Set the assignment solver
    pub const fn set_solver(&mut self, solver: Solver) {
        self.solver = solver;
    }

    /// Set the distance metric
    pub const fn set_metric(&mut self, metric: Metric) {
        self.metric = metric;
    }

    /// Revoke every image held by the selection
    pub fn end_session(&mut self) {
        self.release_master();
        self.clear_tile_images();
        self.store.clear();
    }

    /// Currently selected master image
    pub const fn master_image(&self) -> Option<&UserImage> {
        self.master.as_ref()
    }

    /// Width over height of the loaded master image
    pub const fn master_aspect_ratio(&self) -> Option<f64> {
        self.master_aspect
    }

    /// Tile pool in insertion order
    pub fn tile_images(&self) -> &[UserImage] {
        &self.tiles
    }

    /// Grid shape and repeat limit
    pub const fn grid(&self) -> GridConfig {
        self.grid
    }

    /// Minimum tile pool size for the current grid
    pub const fn required_tiles(&self) -> usize {
        self.grid.required_tiles()
    }

    /// Whether grid height follows grid width
    pub const fn is_aspect_locked(&self) -> bool {
        self.aspect_locked
    }

    /// Output sizing derived from the master image
    pub const fn output_sizing(&self) -> OutputSizing {
        self.sizing
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

    /// Distance metric
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Image registry backing the selection
    pub const fn store(&self) -> &ImageStore {
        &self.store
    }

    fn apply_locked_height(&mut self) {
        if let Some(ratio) = self.master_aspect {
            self.grid.height = locked_height(self.grid.width, ratio);
        }
    }

    fn release_master(&mut self) {
        if let Some(previous) = self.master.take() {
            self.store.revoke(&previous);
        }
        self.master_aspect = None;
        self.aspect_locked = false;
        self.sizing.clear_base_size();
    }
}
