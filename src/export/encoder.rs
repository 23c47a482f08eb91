//! Image encoder abstraction
//!
//! Provides a trait-based encoder system that allows:
//! - One entry point for every output format
//! - Consistent quality settings across formats
//! - Alpha flattening for formats without transparency
//!
//! JPEG goes through the `image` crate's baseline encoder, which exposes no
//! Huffman/coefficient optimisation switch; quality is the only knob.

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

use super::error::EncodeError;
use super::format::OutputFormat;
use crate::constants::DEFAULT_JPEG_QUALITY;
use crate::raster::RasterImage;
use crate::watermark::Color;

/// Quality settings for image encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderQuality {
    /// Quality value (1-100, where 100 is best quality)
    pub quality: u8,
}

impl Default for EncoderQuality {
    fn default() -> Self {
        Self {
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl EncoderQuality {
    /// Create quality settings with specified quality level
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: OutputFormat,
    /// MIME type of `data`
    pub content_type: &'static str,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: OutputFormat) -> Self {
        Self {
            data,
            format,
            content_type: format.content_type(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Trait for image encoders
///
/// Implementations encode an RGBA canvas into one output format.
pub trait ImageEncoder: Send + Sync {
    /// The output format this encoder produces
    fn format(&self) -> OutputFormat;

    /// Encode an RGBA canvas
    fn encode(
        &self,
        canvas: &RgbaImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError>;

    /// Check if this encoder supports transparency
    fn supports_transparency(&self) -> bool;
}

/// JPEG encoder using the image crate
///
/// Alpha is composited over `background` before encoding.
#[derive(Debug, Clone, Copy)]
pub struct JpegEncoder {
    pub background: Color,
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            background: Color::white(),
        }
    }
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(
        &self,
        canvas: &RgbaImage,
        quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
        use image::ImageEncoder as _;

        let rgb_data = flatten_alpha(canvas.as_raw(), self.background);

        let mut output = Cursor::new(Vec::new());
        let encoder =
            ImageJpegEncoder::new_with_quality(&mut output, quality.quality.clamp(1, 100));

        encoder
            .write_image(
                &rgb_data,
                canvas.width(),
                canvas.height(),
                image::ColorType::Rgb8,
            )
            .map_err(|e| EncodeError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Jpeg))
    }

    fn supports_transparency(&self) -> bool {
        false
    }
}

/// PNG encoder using the image crate
///
/// Lossless, default deflate level.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(
        &self,
        canvas: &RgbaImage,
        _quality: EncoderQuality,
    ) -> Result<EncodedImage, EncodeError> {
        use image::codecs::png::{CompressionType, FilterType, PngEncoder as ImagePngEncoder};
        use image::ImageEncoder as _;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new_with_quality(
            &mut output,
            CompressionType::Default,
            FilterType::Adaptive,
        );

        encoder
            .write_image(
                canvas.as_raw(),
                canvas.width(),
                canvas.height(),
                image::ColorType::Rgba8,
            )
            .map_err(|e| EncodeError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), OutputFormat::Png))
    }

    fn supports_transparency(&self) -> bool {
        true
    }
}

/// Factory for creating encoders based on output format
pub struct EncoderFactory;

impl EncoderFactory {
    /// Create an encoder for the specified output format
    pub fn create(format: OutputFormat, background: Color) -> Box<dyn ImageEncoder> {
        match format {
            OutputFormat::Jpeg => Box::new(JpegEncoder { background }),
            OutputFormat::Png => Box::new(PngEncoder),
        }
    }
}

/// Composite RGBA over an opaque background and drop alpha.
///
/// `dst = background * (1 - a) + src * a`
pub fn flatten_alpha(rgba: &[u8], background: Color) -> Vec<u8> {
    let pixel_count = rgba.len() / 4;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    let bg = [background.r, background.g, background.b];
    for chunk in rgba.chunks_exact(4) {
        let alpha = chunk[3] as f32 / 255.0;
        for c in 0..3 {
            let value = bg[c] as f32 * (1.0 - alpha) + chunk[c] as f32 * alpha;
            rgb.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    rgb
}

/// Output target and format options for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    pub format: OutputFormat,
    /// 1-100, only meaningful for JPEG
    #[serde(default = "default_quality")]
    pub quality: u8,
    pub path: PathBuf,
}

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

impl ExportSettings {
    pub fn new(format: OutputFormat, quality: u8, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            quality,
            path: path.into(),
        }
    }

    /// Settings whose format follows the path's extension.
    pub fn for_path(path: impl Into<PathBuf>, quality: u8) -> Result<Self, EncodeError> {
        let path = path.into();
        let format = OutputFormat::from_path(&path)?;
        Ok(Self::new(format, quality, path))
    }

    pub fn encoder_quality(&self) -> EncoderQuality {
        EncoderQuality::with_quality(self.quality)
    }
}

/// Encode a canvas per `settings`, flattening alpha over white for JPEG.
pub fn encode(canvas: &RasterImage, settings: &ExportSettings) -> Result<EncodedImage, EncodeError> {
    encode_with_background(canvas, settings, Color::white())
}

/// [`encode`] with an explicit flattening background.
pub fn encode_with_background(
    canvas: &RasterImage,
    settings: &ExportSettings,
    background: Color,
) -> Result<EncodedImage, EncodeError> {
    EncoderFactory::create(settings.format, background)
        .encode(canvas.pixels(), settings.encoder_quality())
}

fn check_extension(settings: &ExportSettings) -> Result<(), EncodeError> {
    let implied = OutputFormat::from_path(&settings.path)?;
    if implied != settings.format {
        return Err(EncodeError::invalid(format!(
            "{} does not match output format {}",
            settings.path.display(),
            settings.format
        )));
    }
    Ok(())
}

/// Write encoded bytes to `path`.
pub fn write_encoded(path: &Path, encoded: &EncodedImage) -> Result<(), EncodeError> {
    std::fs::write(path, &encoded.data).map_err(|source| EncodeError::IoWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Encode and write a canvas to `settings.path`.
///
/// The path's extension must name a supported format matching
/// `settings.format`. Write failures are returned, not retried.
pub fn export(
    canvas: &RasterImage,
    settings: &ExportSettings,
    background: Color,
) -> Result<EncodedImage, EncodeError> {
    check_extension(settings)?;
    let encoded = encode_with_background(canvas, settings, background)?;
    write_encoded(&settings.path, &encoded)?;

    info!(
        path = %settings.path.display(),
        format = %settings.format,
        quality = settings.quality,
        bytes = encoded.len(),
        "Exported image"
    );
    Ok(encoded)
}
