//! Build constants and runtime configuration defaults

// Grid limits
/// Smallest allowed grid width or height
pub const MIN_GRID_DIMENSION: u32 = 2;
/// Default number of grid columns
pub const DEFAULT_GRID_WIDTH: u32 = 20;
/// Default number of grid rows
pub const DEFAULT_GRID_HEIGHT: u32 = 20;
/// Default maximum uses of a single tile
pub const DEFAULT_TILE_REPEATS: usize = 1;

// Output sizing
/// Smallest upscale factor
pub const MIN_UPSCALE: u32 = 1;
/// Largest upscale factor
pub const MAX_UPSCALE: u32 = 10;
/// Default upscale factor
pub const DEFAULT_UPSCALE: u32 = 1;

/// Lowercase file extensions accepted for master and tile images
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

// Worker settings
/// Thread name given to every spawned mosaic worker
pub const WORKER_THREAD_NAME: &str = "mosaic-worker";
/// Interval between event checks while waiting on a build
pub const EVENT_POLL_INTERVAL_MS: u64 = 100;
/// Message attached to failures caused by a worker crash
pub const CRASH_RETRY_HINT: &str =
    "The mosaic worker stopped unexpectedly and was restarted, please try building again";

// Solver settings
/// Minimum bid increment for the auction solver
pub const AUCTION_EPSILON: i64 = 1;

// Progress display
/// Spinner redraw interval
pub const SPINNER_TICK_MS: u64 = 80;

// Logging
/// Filter used when neither `RUST_LOG` nor `--verbose` is given
pub const DEFAULT_LOG_FILTER: &str = "mosaicbuild=warn";
/// Filter used with `--verbose`
pub const VERBOSE_LOG_FILTER: &str = "mosaicbuild=debug";

// Output settings
/// Suffix added to the rendered mosaic filename
pub const OUTPUT_SUFFIX: &str = "_mosaic";
/// Suffix added to the exported blueprint filename
pub const BLUEPRINT_SUFFIX: &str = "_blueprint";
/// Suffix added to the exported layout filename
pub const LAYOUT_SUFFIX: &str = "_layout";
