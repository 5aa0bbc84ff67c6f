//! Command-line interface for building one mosaic from files on disk

use crate::engine::PhotomosaicFactory;
use crate::geometry::grid::clamp_dimension;
use crate::io::configuration::{
    BLUEPRINT_SUFFIX, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH, DEFAULT_TILE_REPEATS,
    DEFAULT_UPSCALE, EVENT_POLL_INTERVAL_MS, LAYOUT_SUFFIX, MAX_UPSCALE, MIN_GRID_DIMENSION,
    MIN_UPSCALE, OUTPUT_SUFFIX,
};
use crate::io::error::{MosaicError, Result, invalid_parameter};
use crate::io::image::{collect_tile_files, probe_dimensions, read_image_file, write_artifact};
use crate::io::progress::BuildProgress;
use crate::orchestrator::{BuildResult, BuiltMosaic, FailureKind, MosaicSession};
use crate::presentation::layout_blueprint;
use crate::protocol::{ColorMatching, Metric, Solver, TileSizing};
use crate::selection::SelectionState;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "mosaicbuild")]
#[command(
    author,
    version,
    about = "Build a photomosaic from a master image and a directory of tiles"
)]
/// Command-line arguments for the mosaic builder
// Output toggles and verbosity are independent switches
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Master image the mosaic approximates
    #[arg(value_name = "MASTER")]
    pub master: PathBuf,

    /// Directory holding the tile images
    #[arg(value_name = "TILES")]
    pub tiles: PathBuf,

    /// Number of grid columns
    #[arg(short = 'w', long, default_value_t = DEFAULT_GRID_WIDTH)]
    pub width: u32,

    /// Number of grid rows
    #[arg(
        short = 'H',
        long,
        default_value_t = DEFAULT_GRID_HEIGHT,
        conflicts_with = "lock_aspect"
    )]
    pub height: u32,

    /// Derive the grid height from the width and the master's aspect ratio
    #[arg(short = 'l', long)]
    pub lock_aspect: bool,

    /// Maximum number of times each tile may be used
    #[arg(short = 'r', long, default_value_t = DEFAULT_TILE_REPEATS)]
    pub tile_repeats: usize,

    /// Output scale relative to the master image
    #[arg(short = 'u', long, default_value_t = DEFAULT_UPSCALE)]
    pub upscale: u32,

    /// How tiles are fitted to the cell size
    #[arg(long, value_enum, default_value_t)]
    pub tile_sizing: TileSizing,

    /// Colour transfer applied before matching
    #[arg(long, value_enum, default_value_t)]
    pub color_matching: ColorMatching,

    /// Tile assignment strategy
    #[arg(long, value_enum, default_value_t)]
    pub solver: Solver,

    /// Cell-to-tile distance metric
    #[arg(long, value_enum, default_value_t)]
    pub metric: Metric,

    /// Mosaic output path (defaults to <MASTER>_mosaic.png)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also write the blueprint as JSON next to the mosaic
    #[arg(short, long)]
    pub blueprint: bool,

    /// Also write the percentage layout as JSON next to the mosaic
    #[arg(short = 'L', long)]
    pub layout: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Where the rendered mosaic is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| sibling_path(&self.master, OUTPUT_SUFFIX, "png"))
    }

    /// Where the blueprint JSON is written
    pub fn blueprint_path(&self) -> PathBuf {
        sibling_path(&self.output_path(), BLUEPRINT_SUFFIX, "json")
    }

    /// Where the layout JSON is written
    pub fn layout_path(&self) -> PathBuf {
        sibling_path(&self.output_path(), LAYOUT_SUFFIX, "json")
    }

    /// Reject values outside the supported ranges
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid parameter
    pub fn validate(&self) -> Result<()> {
        if self.width < MIN_GRID_DIMENSION {
            return Err(invalid_parameter(
                "width",
                &self.width,
                &format!("must be at least {MIN_GRID_DIMENSION}"),
            ));
        }
        if !self.lock_aspect && self.height < MIN_GRID_DIMENSION {
            return Err(invalid_parameter(
                "height",
                &self.height,
                &format!("must be at least {MIN_GRID_DIMENSION}"),
            ));
        }
        if self.tile_repeats == 0 {
            return Err(invalid_parameter(
                "tile-repeats",
                &self.tile_repeats,
                &"must be at least 1",
            ));
        }
        if !(MIN_UPSCALE..=MAX_UPSCALE).contains(&self.upscale) {
            return Err(invalid_parameter(
                "upscale",
                &self.upscale,
                &format!("must be between {MIN_UPSCALE} and {MAX_UPSCALE}"),
            ));
        }
        Ok(())
    }
}

/// Runs one build from the command line and writes its artifacts
pub struct MosaicProcessor {
    cli: Cli,
    progress: BuildProgress,
}

impl MosaicProcessor {
    /// Create a processor for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress = BuildProgress::new(!cli.should_show_progress());
        Self { cli, progress }
    }

    /// Load the inputs, build the mosaic and write the requested artifacts
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An argument is out of range
    /// - The master image or tile directory cannot be read
    /// - The build is refused or fails
    /// - An artifact cannot be written
    pub fn process(&self) -> Result<()> {
        self.cli.validate()?;
        let start_time = Instant::now();

        let mut session = MosaicSession::new(PhotomosaicFactory)?;
        self.load_selection(session.selection_mut())?;

        let grid = session.grid();
        let request = session.trigger_build()?;
        self.progress.start(format!(
            "Building {}x{} mosaic from {} tiles ({request})",
            grid.width,
            grid.height,
            session.selection().tile_images().len()
        ));

        let interval = Duration::from_millis(EVENT_POLL_INTERVAL_MS);
        while session.is_building() {
            session.wait_for_event(interval);
        }

        match session.result() {
            Some(BuildResult::Succeeded(mosaic)) => {
                self.write_outputs(mosaic, session.selection())?;
                self.progress.finish_success(format!(
                    "Mosaic written to {} in {:.1}s",
                    self.cli.output_path().display(),
                    start_time.elapsed().as_secs_f64()
                ));
                Ok(())
            }
            Some(BuildResult::Failed(failure)) => {
                self.progress.finish_failure(failure.user_message());
                Err(match failure.kind {
                    FailureKind::Engine => MosaicError::BuildFailed {
                        reason: failure.reason.clone(),
                    },
                    FailureKind::Crash => MosaicError::WorkerCrashed {
                        reason: failure.user_message(),
                    },
                })
            }
            Some(BuildResult::Pending) | None => {
                self.progress.finish_failure("Build did not settle");
                Err(MosaicError::WorkerChannelClosed)
            }
        }
    }

    fn load_selection(&self, selection: &mut SelectionState) -> Result<()> {
        let (name, bytes) = read_image_file(&self.cli.master)?;
        let natural_size = probe_dimensions(&bytes, &name)?;
        let master = selection.set_master_image(name, bytes);
        selection.master_image_loaded(&master, natural_size);

        let tile_files = collect_tile_files(&self.cli.tiles)?;
        let tiles = tile_files
            .iter()
            .map(|path| read_image_file(path))
            .collect::<Result<Vec<_>>>()?;
        selection.add_tile_images(tiles);
        debug!(
            master = master.name(),
            tiles = selection.tile_images().len(),
            "inputs loaded"
        );

        selection.set_tile_repeats(self.cli.tile_repeats);
        selection.set_upscale(self.cli.upscale);
        selection.set_tile_sizing(self.cli.tile_sizing);
        selection.set_color_matching(self.cli.color_matching);
        selection.set_solver(self.cli.solver);
        selection.set_metric(self.cli.metric);

        selection.set_grid_width(clamp_dimension(self.cli.width));
        if self.cli.lock_aspect {
            selection.set_aspect_lock(true);
        } else {
            selection.set_grid_height(clamp_dimension(self.cli.height));
        }
        Ok(())
    }

    fn write_outputs(&self, mosaic: &BuiltMosaic, selection: &SelectionState) -> Result<()> {
        let output_path = self.cli.output_path();
        write_artifact(&output_path, &mosaic.rendered_image)?;
        info!(path = %output_path.display(), "mosaic written");

        if self.cli.blueprint {
            write_json(&self.cli.blueprint_path(), &mosaic.blueprint)?;
        }

        if self.cli.layout {
            let layout = layout_blueprint(
                &mosaic.blueprint,
                selection.tile_sizing(),
                selection.output_sizing().aspect_ratio(),
            )?;
            write_json(&self.cli.layout_path(), &layout)?;
        }
        Ok(())
    }
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| MosaicError::Serialization {
        path: path.to_path_buf(),
        source,
    })?;
    write_artifact(path, &json)?;
    info!(path = %path.display(), "json written");
    Ok(())
}

fn sibling_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or_default();
    let name = format!("{}{suffix}.{extension}", stem.to_string_lossy());

    path.parent()
        .map_or_else(|| PathBuf::from(&name), |parent| parent.join(&name))
}
