//! Raster loading and resampling.
//!
//! Decodes source photographs (JPEG, PNG, BMP, TIFF) and watermark logos
//! (PNG, JPEG, BMP, GIF) into an immutable [`RasterImage`]. Pixels are kept
//! as RGBA8 regardless of the file's own colour mode; the original mode is
//! remembered so callers can tell whether the source carried alpha.
//!
//! Nothing here mutates an existing image: resizing or compositing always
//! yields a new `RasterImage`.

pub mod error;
pub mod resize;

pub use error::RasterError;
pub use resize::resize_rgba;

use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat, RgbaImage};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::geometry::Size;

/// Extensions accepted for source photographs.
pub const SOURCE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif"];

/// Extensions accepted for image watermarks (logos).
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Default edge length for list thumbnails.
pub const THUMBNAIL_SIZE: u32 = 100;

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check whether a path looks like a supported source photograph.
pub fn is_supported_source(path: &Path) -> bool {
    has_extension(path, SOURCE_EXTENSIONS)
}

/// Check whether a path looks like a supported watermark logo.
pub fn is_supported_logo(path: &Path) -> bool {
    has_extension(path, LOGO_EXTENSIONS)
}

/// Colour mode of the decoded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorMode {
    Rgb,
    Rgba,
}

impl ColorMode {
    fn of(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            ColorMode::Rgba
        } else {
            ColorMode::Rgb
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Rgb => "RGB",
            ColorMode::Rgba => "RGBA",
        }
    }
}

/// A decoded bitmap.
#[derive(Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
    mode: ColorMode,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("dimensions", &(self.pixels.width(), self.pixels.height()))
            .field("mode", &self.mode)
            .field("source", &self.source)
            .finish()
    }
}

impl RasterImage {
    pub fn new(pixels: RgbaImage, mode: ColorMode) -> Self {
        Self {
            pixels,
            mode,
            source: None,
        }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        let mode = ColorMode::of(&image);
        Self::new(image.to_rgba8(), mode)
    }

    /// Decode an image file. Format is sniffed from content, not extension.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RasterError> {
        let path = path.as_ref();
        let shown = path.display().to_string();

        let image = ImageReader::open(path)
            .map_err(|e| RasterError::decode(&shown, e))?
            .with_guessed_format()
            .map_err(|e| RasterError::decode(&shown, e))?
            .decode()
            .map_err(|e| RasterError::decode(&shown, e))?;

        debug!(
            path = %shown,
            width = image.width(),
            height = image.height(),
            "Decoded raster"
        );

        let mut raster = Self::from_dynamic(image);
        raster.source = Some(path.to_path_buf());
        Ok(raster)
    }

    /// Decode an in-memory image.
    pub fn decode(data: &[u8]) -> Result<Self, RasterError> {
        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| RasterError::decode("<memory>", e))?
            .decode()
            .map_err(|e| RasterError::decode("<memory>", e))?;
        Ok(Self::from_dynamic(image))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Size {
        Size::new(self.pixels.width(), self.pixels.height())
    }

    pub fn color_mode(&self) -> ColorMode {
        self.mode
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    /// New image with replaced pixels, keeping mode and source path.
    pub fn with_pixels(&self, pixels: RgbaImage) -> Self {
        Self {
            pixels,
            mode: self.mode,
            source: self.source.clone(),
        }
    }

    /// Resample to exactly `size`.
    pub fn resized(&self, size: Size) -> Result<Self, RasterError> {
        Ok(self.with_pixels(resize_rgba(&self.pixels, size)?))
    }

    /// Aspect-preserving copy that fits inside `max_size` x `max_size`.
    pub fn thumbnail(&self, max_size: u32) -> Result<Self, RasterError> {
        let target = self
            .size()
            .fit_within(Size::new(max_size, max_size))
            .ok_or_else(|| RasterError::resize_failed("Cannot thumbnail an empty image"))?;
        self.resized(target)
    }
}

/// Summary of an image file, as shown in the file list tooltip.
#[derive(Debug, Clone, Serialize)]
pub struct RasterInfo {
    pub file_name: String,
    pub file_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: Option<String>,
    pub mode: ColorMode,
    pub size_kb: f64,
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        other => format!("{:?}", other).to_uppercase(),
    }
}

/// Decode a file and collect its dimensions, format, mode and size.
pub fn probe(path: impl AsRef<Path>) -> Result<RasterInfo, RasterError> {
    let path = path.as_ref();
    let shown = path.display().to_string();

    let reader = ImageReader::open(path)
        .map_err(|e| RasterError::decode(&shown, e))?
        .with_guessed_format()
        .map_err(|e| RasterError::decode(&shown, e))?;
    let format = reader.format().map(format_name);
    let image = reader
        .decode()
        .map_err(|e| RasterError::decode(&shown, e))?;

    let bytes = std::fs::metadata(path)
        .map_err(|e| RasterError::decode(&shown, e))?
        .len();
    let size_kb = (bytes as f64 / 1024.0 * 100.0).round() / 100.0;

    Ok(RasterInfo {
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        file_path: path.to_path_buf(),
        width: image.width(),
        height: image.height(),
        format,
        mode: ColorMode::of(&image),
        size_kb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 128]));
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn test_supported_source_extensions() {
        assert!(is_supported_source(Path::new("a.JPG")));
        assert!(is_supported_source(Path::new("a/b/c.tif")));
        assert!(is_supported_source(Path::new("photo.bmp")));
        assert!(!is_supported_source(Path::new("anim.gif")));
        assert!(!is_supported_source(Path::new("noext")));
    }

    #[test]
    fn test_supported_logo_extensions() {
        assert!(is_supported_logo(Path::new("logo.gif")));
        assert!(is_supported_logo(Path::new("logo.PNG")));
        assert!(!is_supported_logo(Path::new("logo.tiff")));
    }

    #[test]
    fn test_open_png_keeps_alpha_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "logo.png", 12, 7);

        let raster = RasterImage::open(&path).unwrap();
        assert_eq!(raster.size(), Size::new(12, 7));
        assert_eq!(raster.color_mode(), ColorMode::Rgba);
        assert_eq!(raster.source_path(), Some(path.as_path()));
    }

    #[test]
    fn test_open_jpeg_is_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([0, 128, 255]));
        img.save_with_format(&path, ImageFormat::Jpeg).unwrap();

        let raster = RasterImage::open(&path).unwrap();
        assert_eq!(raster.color_mode(), ColorMode::Rgb);
    }

    #[test]
    fn test_open_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();

        let err = RasterImage::open(&path).unwrap_err();
        assert!(matches!(err, RasterError::Decode { .. }));
    }

    #[test]
    fn test_open_missing_file_is_decode_error() {
        let err = RasterImage::open("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, RasterError::Decode { .. }));
    }

    #[test]
    fn test_resized_returns_new_image() {
        let raster = RasterImage::new(
            RgbaImage::from_pixel(20, 10, Rgba([1, 2, 3, 255])),
            ColorMode::Rgb,
        );
        let smaller = raster.resized(Size::new(10, 5)).unwrap();
        assert_eq!(smaller.size(), Size::new(10, 5));
        assert_eq!(raster.size(), Size::new(20, 10));
        assert_eq!(smaller.color_mode(), ColorMode::Rgb);
    }

    #[test]
    fn test_thumbnail_preserves_aspect() {
        let raster = RasterImage::new(
            RgbaImage::from_pixel(400, 200, Rgba([1, 2, 3, 255])),
            ColorMode::Rgb,
        );
        let thumb = raster.thumbnail(THUMBNAIL_SIZE).unwrap();
        assert_eq!(thumb.size(), Size::new(100, 50));
    }

    #[test]
    fn test_probe_reports_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "probe.png", 30, 20);

        let info = probe(&path).unwrap();
        assert_eq!(info.file_name, "probe.png");
        assert_eq!((info.width, info.height), (30, 20));
        assert_eq!(info.format.as_deref(), Some("PNG"));
        assert_eq!(info.mode, ColorMode::Rgba);
        assert!(info.size_kb > 0.0);
    }
}
