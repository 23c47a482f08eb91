//! Image (logo) watermark rendering.

use tracing::debug;

use super::painter::Painter;
use super::spec::ImageWatermarkSpec;
use super::WatermarkError;
use crate::geometry::{Point, Size};
use crate::raster::RasterImage;

/// Margin from the top and right edges when a logo has no placement.
pub const DEFAULT_MARGIN: i32 = 10;

/// Final logo size for a requested `width` x `height` box.
///
/// Proportional mode fits the source inside the box (the result may be
/// smaller than the box on one axis). Otherwise the logo is stretched to
/// the box exactly.
pub fn logo_box(source: Size, requested: Size, proportional: bool) -> Result<Size, WatermarkError> {
    if source.is_empty() {
        return Err(WatermarkError::DegenerateSize {
            width: source.width,
            height: source.height,
        });
    }
    if requested.is_empty() {
        return Err(WatermarkError::DegenerateSize {
            width: requested.width,
            height: requested.height,
        });
    }
    if !proportional {
        return Ok(requested);
    }

    let scale = (requested.width as f64 / source.width as f64)
        .min(requested.height as f64 / source.height as f64);
    Ok(Size::new(
        ((source.width as f64 * scale).round() as u32).max(1),
        ((source.height as f64 * scale).round() as u32).max(1),
    ))
}

/// Top-right corner with [`DEFAULT_MARGIN`], for the current canvas size.
pub fn default_placement(canvas: Size, logo: Size) -> Point {
    Point::new(
        canvas.width as i32 - logo.width as i32 - DEFAULT_MARGIN,
        DEFAULT_MARGIN,
    )
}

/// Decode the spec's logo. A path that no longer exists is
/// [`WatermarkError::MissingAsset`].
pub fn load_logo(spec: &ImageWatermarkSpec) -> Result<RasterImage, WatermarkError> {
    if !spec.path.exists() {
        return Err(WatermarkError::MissingAsset(spec.path.clone()));
    }
    Ok(RasterImage::open(&spec.path)?)
}

/// Scale `logo` per the spec and draw it at `placement` (or the default
/// top-right spot).
///
/// `size` is the requested box already mapped into the canvas space. Opacity
/// is applied for this one draw and reset to 1.0 afterwards.
pub fn render_image(
    painter: &mut Painter<'_>,
    logo: &RasterImage,
    spec: &ImageWatermarkSpec,
    size: Size,
    placement: Option<Point>,
) -> Result<Size, WatermarkError> {
    let target = logo_box(logo.size(), size, spec.proportional)?;
    let scaled = logo.resized(target)?;

    let canvas = Size::new(painter.width(), painter.height());
    let at = placement.unwrap_or_else(|| default_placement(canvas, target));

    painter.set_opacity(spec.opacity_factor());
    painter.draw_image(scaled.pixels(), at.x as f64, at.y as f64);
    painter.set_opacity(1.0);

    debug!(
        x = at.x,
        y = at.y,
        width = target.width,
        height = target.height,
        opacity = spec.opacity,
        "Rendered image watermark"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ColorMode;
    use image::{ImageFormat, Rgba, RgbaImage};

    fn logo(w: u32, h: u32, color: Rgba<u8>) -> RasterImage {
        RasterImage::new(RgbaImage::from_pixel(w, h, color), ColorMode::Rgba)
    }

    #[test]
    fn test_proportional_fits_inside_box() {
        let size = logo_box(Size::new(200, 100), Size::new(100, 100), true).unwrap();
        assert_eq!(size, Size::new(100, 50));

        let size = logo_box(Size::new(100, 400), Size::new(100, 100), true).unwrap();
        assert_eq!(size, Size::new(25, 100));
    }

    #[test]
    fn test_stretch_ignores_aspect() {
        let size = logo_box(Size::new(200, 100), Size::new(100, 100), false).unwrap();
        assert_eq!(size, Size::new(100, 100));
    }

    #[test]
    fn test_logo_box_degenerate() {
        assert!(logo_box(Size::new(0, 5), Size::new(10, 10), true).is_err());
        assert!(logo_box(Size::new(5, 5), Size::new(0, 10), true).is_err());
    }

    #[test]
    fn test_default_placement_tracks_canvas() {
        let logo = Size::new(100, 50);
        assert_eq!(default_placement(Size::new(800, 600), logo), Point::new(690, 10));
        assert_eq!(default_placement(Size::new(400, 300), logo), Point::new(290, 10));
    }

    #[test]
    fn test_render_scenario_200x100_into_100x100() {
        let mut canvas = RgbaImage::from_pixel(300, 200, Rgba([0, 0, 0, 255]));
        let spec = ImageWatermarkSpec {
            opacity: 100,
            ..ImageWatermarkSpec::new("logo.png", 100, 100)
        };
        let logo = logo(200, 100, Rgba([255, 255, 255, 255]));

        let drawn = {
            let mut painter = Painter::new(&mut canvas);
            let drawn = render_image(&mut painter, &logo, &spec, Size::new(100, 100), None).unwrap();
            assert_eq!(painter.opacity(), 1.0);
            drawn
        };
        assert_eq!(drawn, Size::new(100, 50));

        // Top-right, 10px margins: x in 190..290, y in 10..60.
        assert!(canvas.get_pixel(200, 30)[0] > 250);
        assert_eq!(canvas.get_pixel(185, 30)[0], 0);
        assert_eq!(canvas.get_pixel(200, 65)[0], 0);
        assert_eq!(canvas.get_pixel(295, 30)[0], 0);
    }

    #[test]
    fn test_render_opacity_does_not_leak() {
        let mut canvas = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255]));
        let spec = ImageWatermarkSpec {
            opacity: 50,
            ..ImageWatermarkSpec::new("logo.png", 10, 10)
        };
        let logo = logo(10, 10, Rgba([200, 200, 200, 255]));
        let mut painter = Painter::new(&mut canvas);
        render_image(&mut painter, &logo, &spec, Size::new(10, 10), Some(Point::new(0, 0)))
            .unwrap();
        assert_eq!(painter.opacity(), 1.0);
        drop(painter);
        assert_eq!(canvas.get_pixel(5, 5)[0], 100);
    }

    #[test]
    fn test_load_logo_missing_asset() {
        let spec = ImageWatermarkSpec::new("/no/such/logo.png", 10, 10);
        let err = load_logo(&spec).unwrap_err();
        assert!(matches!(err, WatermarkError::MissingAsset(_)));
    }

    #[test]
    fn test_load_logo_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(8, 4, Rgba([1, 2, 3, 255]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        let spec = ImageWatermarkSpec::new(&path, 10, 10);
        assert_eq!(load_logo(&spec).unwrap().size(), Size::new(8, 4));
    }
}
