//! Export error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while sizing, encoding or writing an export.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to write {}: {source}", path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode to {format}: {message}")]
    EncodeFailed { format: String, message: String },

    #[error("Invalid export settings: {0}")]
    InvalidSettings(String),

    /// Another input in the same batch already maps to this output path.
    #[error("Output {} is already taken by {}", path.display(), claimed_by.display())]
    OutputConflict { path: PathBuf, claimed_by: PathBuf },
}

impl EncodeError {
    pub fn encode_failed(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidSettings(message.into())
    }
}
