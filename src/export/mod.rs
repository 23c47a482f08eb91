//! Export: canvas sizing, encoding and batch output.
//!
//! ```text
//! source ──apply_sizing──▶ sized canvas ──Compositor──▶ watermarked ──encode──▶ file
//! ```
//!
//! The watermark spec is mapped from its [`ReferenceSpace`](crate::watermark::ReferenceSpace)
//! onto the sized canvas, so a spec authored on the preview lands in the same
//! relative spot at any output size.

pub mod batch;
pub mod encoder;
pub mod error;
pub mod format;
pub mod naming;
pub mod sizing;

pub use batch::{export_all, export_file, render_for_export, BatchFailure, BatchReport, ExportOptions};
pub use encoder::{
    encode, encode_with_background, export, flatten_alpha, write_encoded, EncodedImage,
    EncoderFactory, EncoderQuality, ExportSettings, ImageEncoder, JpegEncoder, PngEncoder,
};
pub use error::EncodeError;
pub use format::OutputFormat;
pub use naming::{targets_source_folder, NamingRule, DEFAULT_PREFIX, DEFAULT_SUFFIX};
pub use sizing::{apply_sizing, SizingPolicy};
