//! Error types for selection validation, the engine boundary and file operations

use std::fmt;
use std::path::PathBuf;

/// Reasons a build trigger is refused before anything reaches the worker
///
/// These are local and synchronous. Retrying without changing the selection
/// or waiting for the outstanding build fails the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No master image is selected
    MissingMasterImage,

    /// The tile pool is smaller than the grid needs for the repeat limit
    InsufficientTiles {
        /// Minimum pool size for the current grid and tile repeats
        required: usize,
        /// Current pool size
        have: usize,
    },

    /// A build is already dispatched and has not settled
    Busy,

    /// A selected image was revoked before the request snapshot was taken
    RevokedImage {
        /// Display name of the revoked image
        name: String,
    },

    /// No worker could be started to receive the request
    WorkerUnavailable {
        /// Why the worker could not be started
        reason: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMasterImage => write!(f, "Please select a master image"),
            Self::InsufficientTiles { required, have } => {
                write!(
                    f,
                    "Please select at least {required} tile images ({have} selected)"
                )
            }
            Self::Busy => write!(f, "A mosaic is already being built"),
            Self::RevokedImage { name } => {
                write!(f, "Image '{name}' is no longer available")
            }
            Self::WorkerUnavailable { reason } => {
                write!(f, "Mosaic worker is unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Failures reported by a mosaic engine for one request
///
/// The worker turns these into well-formed error replies; the engine that
/// produced them stays usable for the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Image bytes could not be decoded
    Decode {
        /// Name of the image that failed
        name: String,
        /// Decoder message
        reason: String,
    },

    /// Grid dimensions do not fit the master image
    InvalidGrid {
        /// Description of the mismatch
        reason: String,
    },

    /// A tile is smaller than a grid cell and cannot be cropped to it
    TileTooSmall {
        /// Position of the tile in the pool
        index: usize,
        /// Tile dimensions (width, height)
        tile: (u32, u32),
        /// Cell dimensions (width, height)
        cell: (u32, u32),
    },

    /// Tile-to-cell assignment could not be completed
    Assignment {
        /// Description of the solver failure
        reason: String,
    },

    /// A blueprint referenced a tile outside the pool
    InvalidTileIndex {
        /// The offending index
        index: usize,
        /// Pool size
        tiles: usize,
    },

    /// A tile could not be painted at its cell while rendering
    TilePlacement {
        /// Column of the cell
        x: u32,
        /// Row of the cell
        y: u32,
        /// Why the tile did not fit
        reason: String,
    },

    /// Encoding an output image failed
    Encode {
        /// Encoder message
        reason: String,
    },

    /// The engine could not be constructed
    Initialization {
        /// Why construction failed
        reason: String,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { name, reason } => {
                write!(f, "Failed to decode image '{name}': {reason}")
            }
            Self::InvalidGrid { reason } => write!(f, "Invalid grid: {reason}"),
            Self::TileTooSmall { index, tile, cell } => {
                write!(
                    f,
                    "Could not crop tile {index} ({}x{}) to the cell size {}x{}",
                    tile.0, tile.1, cell.0, cell.1
                )
            }
            Self::Assignment { reason } => write!(f, "Tile assignment failed: {reason}"),
            Self::InvalidTileIndex { index, tiles } => {
                write!(f, "Tile index {index} is out of range ({tiles} tiles)")
            }
            Self::TilePlacement { x, y, reason } => {
                write!(f, "Could not place tile at cell ({x}, {y}): {reason}")
            }
            Self::Encode { reason } => write!(f, "Failed to encode image: {reason}"),
            Self::Initialization { reason } => {
                write!(f, "Engine initialization failed: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

/// Main error type for CLI and file level operations
#[derive(Debug)]
pub enum MosaicError {
    /// A build was refused at trigger time
    Build(BuildError),

    /// The engine reported an error for the request
    BuildFailed {
        /// Engine message
        reason: String,
    },

    /// The worker crashed while the request was in flight
    WorkerCrashed {
        /// Crash description including the retry hint
        reason: String,
    },

    /// The worker thread could not be spawned
    WorkerSpawn {
        /// Underlying thread creation error
        source: std::io::Error,
    },

    /// The worker command channel is closed
    WorkerChannelClosed,

    /// File is not one of the supported raster formats
    UnsupportedFormat {
        /// Offending path
        path: PathBuf,
    },

    /// Image header could not be read
    ImageProbe {
        /// Name of the probed image
        name: String,
        /// Underlying decoder error
        source: image::ImageError,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value
        value: String,
        /// Why the value is invalid
        reason: String,
    },

    /// Blueprint cannot be laid out or resolved
    Layout {
        /// Description of the problem
        reason: String,
    },

    /// JSON export failed
    Serialization {
        /// Destination path
        path: PathBuf,
        /// Underlying serializer error
        source: serde_json::Error,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(error) => write!(f, "{error}"),
            Self::BuildFailed { reason } => {
                write!(f, "Error while building mosaic: {reason}")
            }
            Self::WorkerCrashed { reason } => write!(f, "{reason}"),
            Self::WorkerSpawn { source } => {
                write!(f, "Failed to start mosaic worker: {source}")
            }
            Self::WorkerChannelClosed => write!(f, "Mosaic worker channel is closed"),
            Self::UnsupportedFormat { path } => {
                write!(f, "Unsupported image format: '{}'", path.display())
            }
            Self::ImageProbe { name, source } => {
                write!(f, "Failed to read image '{name}': {source}")
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Layout { reason } => write!(f, "Invalid blueprint: {reason}"),
            Self::Serialization { path, source } => {
                write!(f, "Failed to serialize '{}': {source}", path.display())
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Build(error) => Some(error),
            Self::WorkerSpawn { source } | Self::FileSystem { source, .. } => Some(source),
            Self::ImageProbe { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for crate results
pub type Result<T> = std::result::Result<T, MosaicError>;

impl From<BuildError> for MosaicError {
    fn from(err: BuildError) -> Self {
        Self::Build(err)
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MosaicError {
    MosaicError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a file system error for a specific path and operation
pub fn file_system_error(
    path: impl Into<PathBuf>,
    operation: &'static str,
    source: std::io::Error,
) -> MosaicError {
    MosaicError::FileSystem {
        path: path.into(),
        operation,
        source,
    }
}
