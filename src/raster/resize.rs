//! Lanczos3 resampling through fast-image-resize.

use fast_image_resize::{FilterType, Image, PixelType, ResizeAlg, Resizer};
use image::RgbaImage;
use std::num::NonZeroU32;

use super::error::RasterError;
use crate::geometry::Size;

/// Resample an RGBA buffer to exactly `target`, ignoring aspect ratio.
///
/// Returns a copy when the size is unchanged.
pub fn resize_rgba(src: &RgbaImage, target: Size) -> Result<RgbaImage, RasterError> {
    let (src_w, src_h) = src.dimensions();
    if src_w == target.width && src_h == target.height {
        return Ok(src.clone());
    }

    let src_width =
        NonZeroU32::new(src_w).ok_or_else(|| RasterError::resize_failed("Source width is 0"))?;
    let src_height =
        NonZeroU32::new(src_h).ok_or_else(|| RasterError::resize_failed("Source height is 0"))?;
    let dst_width = NonZeroU32::new(target.width)
        .ok_or_else(|| RasterError::resize_failed("Target width is 0"))?;
    let dst_height = NonZeroU32::new(target.height)
        .ok_or_else(|| RasterError::resize_failed("Target height is 0"))?;

    let src_image = Image::from_vec_u8(src_width, src_height, src.as_raw().clone(), PixelType::U8x4)
        .map_err(|e| {
            RasterError::resize_failed(format!("Failed to create source image: {:?}", e))
        })?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));

    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| RasterError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    RgbaImage::from_raw(target.width, target.height, dst_image.into_vec())
        .ok_or_else(|| RasterError::resize_failed("Failed to create output image buffer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_resize_changes_dimensions() {
        let src = RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255]));
        let out = resize_rgba(&src, Size::new(10, 30)).unwrap();
        assert_eq!(out.dimensions(), (10, 30));
    }

    #[test]
    fn test_resize_preserves_flat_color() {
        let src = RgbaImage::from_pixel(64, 64, Rgba([200, 100, 50, 255]));
        let out = resize_rgba(&src, Size::new(16, 16)).unwrap();
        let p = out.get_pixel(8, 8);
        assert!((p[0] as i32 - 200).abs() <= 1);
        assert!((p[1] as i32 - 100).abs() <= 1);
        assert!((p[2] as i32 - 50).abs() <= 1);
    }

    #[test]
    fn test_resize_same_size_is_copy() {
        let src = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 4]));
        let out = resize_rgba(&src, Size::new(5, 5)).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn test_resize_zero_target_fails() {
        let src = RgbaImage::from_pixel(5, 5, Rgba([1, 2, 3, 4]));
        assert!(resize_rgba(&src, Size::new(0, 5)).is_err());
    }
}
