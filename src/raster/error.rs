//! Raster decode/resample errors.

use thiserror::Error;

/// Errors raised while loading or resampling a raster.
#[derive(Error, Debug, Clone)]
pub enum RasterError {
    /// Unreadable, corrupt, or undecodable source image.
    #[error("Failed to decode image {path}: {message}")]
    Decode { path: String, message: String },

    /// File extension is not one of the accepted input formats.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Resampling failed (zero-sized source or target).
    #[error("Resize failed: {0}")]
    ResizeFailed(String),
}

impl RasterError {
    pub fn decode(path: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn resize_failed(message: impl Into<String>) -> Self {
        Self::ResizeFailed(message.into())
    }
}
