//! Watermark error types.
//!
//! Defines errors that can occur while mapping, laying out or compositing
//! watermarks.

use std::fmt;
use std::path::PathBuf;

use crate::raster::RasterError;

/// Errors that can occur during watermark processing.
#[derive(Debug, Clone)]
pub enum WatermarkError {
    /// A zero-sized canvas reached the coordinate mapper
    DegenerateSize { width: u32, height: u32 },

    /// Watermark logo path no longer exists on disk
    MissingAsset(PathBuf),

    /// Failed to decode or resample a watermark logo
    Raster(RasterError),

    /// No usable font face could be found
    FontUnavailable(String),

    /// Grid cell outside the 3x3 anchor grid
    InvalidGridCell { row: u8, col: u8 },

    /// Invalid watermark configuration
    ConfigError(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateSize { width, height } => {
                write!(f, "Degenerate canvas size {}x{}", width, height)
            }
            Self::MissingAsset(path) => {
                write!(f, "Watermark asset not found: {}", path.display())
            }
            Self::Raster(err) => write!(f, "Watermark image error: {}", err),
            Self::FontUnavailable(msg) => write!(f, "Font unavailable: {}", msg),
            Self::InvalidGridCell { row, col } => {
                write!(f, "Invalid anchor grid cell ({}, {})", row, col)
            }
            Self::ConfigError(msg) => write!(f, "Watermark configuration error: {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Raster(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RasterError> for WatermarkError {
    fn from(err: RasterError) -> Self {
        Self::Raster(err)
    }
}
