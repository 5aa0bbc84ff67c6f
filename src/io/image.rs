//! Raster file input, natural-size probing and artifact export

use crate::io::configuration::SUPPORTED_EXTENSIONS;
use crate::io::error::{MosaicError, Result, file_system_error};
use image::ImageReader;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Whether the path carries one of the supported raster extensions
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(extension))
        })
}

/// Read a supported image file, returning its display name and raw bytes
///
/// # Errors
///
/// Returns an error if:
/// - The extension is not a supported raster format
/// - The file cannot be read
pub fn read_image_file(path: &Path) -> Result<(String, Vec<u8>)> {
    if !is_supported(path) {
        return Err(MosaicError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| file_system_error(path, "read image", e))?;
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok((name, bytes))
}

/// Supported image files directly inside `dir`, sorted by path
///
/// Files with other extensions and subdirectories are skipped.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed
pub fn collect_tile_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).map_err(|e| file_system_error(dir, "list tile directory", e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| file_system_error(dir, "read directory entry", e))?
            .path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Natural pixel dimensions of encoded image bytes
///
/// Only the header is decoded.
///
/// # Errors
///
/// Returns an error if the format cannot be recognised or the header is invalid
pub fn probe_dimensions(bytes: &[u8], name: &str) -> Result<(u32, u32)> {
    let probe_error = |source| MosaicError::ImageProbe {
        name: name.to_string(),
        source,
    };
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| probe_error(image::ImageError::IoError(e)))?
        .into_dimensions()
        .map_err(probe_error)
}

/// Write an output artifact, creating parent directories as needed
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| file_system_error(parent, "create directory", e))?;
    }
    std::fs::write(path, bytes).map_err(|e| file_system_error(path, "write artifact", e))
}
