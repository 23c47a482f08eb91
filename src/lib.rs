// Filigree watermark compositing library
//
// Text and logo watermarks rendered onto raster images, with a live preview
// session and full-resolution export that agree on placement.

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod geometry;
pub mod logging;
pub mod preview;
pub mod raster;
pub mod templates;
pub mod watermark;

pub use error::{Error, Result};
