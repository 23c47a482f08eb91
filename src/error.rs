// Error types module

use thiserror::Error;

use crate::config::ConfigError;
use crate::export::EncodeError;
use crate::raster::RasterError;
use crate::templates::TemplateError;
use crate::watermark::WatermarkError;

/// Crate-level error returned by the pipelines that span modules
/// (export, batch, preview session).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Watermark(#[from] WatermarkError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
