//! Watermark compositor.
//!
//! Draws one image layer and one text layer onto a copy of a canvas. The
//! same code path serves the live preview and the export; callers pass the
//! [`ScaleFactors`] that carry the spec's authoring space onto this canvas.
//!
//! Layer order is fixed: logo first, text on top.
//!
//! # Example
//!
//! ```ignore
//! use filigree::watermark::{Compositor, FontBook, ScaleFactors};
//!
//! let fonts = FontBook::system("DejaVu Sans");
//! let compositor = Compositor::new(&fonts);
//! let result = compositor.compose(&canvas, &spec, ScaleFactors::IDENTITY)?;
//! ```

use tracing::debug;

use super::font::FontBook;
use super::image_renderer::{load_logo, render_image};
use super::mapper::ScaleFactors;
use super::painter::Painter;
use super::position::resolve_anchor;
use super::spec::{Placement, WatermarkSpec};
use super::text_renderer::{render_text, text_box};
use super::WatermarkError;
use crate::geometry::{Point, Size};
use crate::raster::RasterImage;

/// Where the compositor gets the image layer's bitmap.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogoSource<'a> {
    /// Decode the spec's logo path on every call.
    #[default]
    Load,
    /// Already decoded by the caller.
    Decoded(&'a RasterImage),
    /// The caller knows the file is gone; skip the image layer.
    Missing,
}

/// Composites watermark specs onto canvases.
#[derive(Debug, Clone, Copy)]
pub struct Compositor<'f> {
    fonts: &'f FontBook,
}

impl<'f> Compositor<'f> {
    pub fn new(fonts: &'f FontBook) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &'f FontBook {
        self.fonts
    }

    /// Baseline-left text anchor on a canvas of `canvas` size.
    ///
    /// Absolute placements are mapped through `factors`; named anchors are
    /// resolved against the canvas and the text box measured at the scaled
    /// font size.
    pub fn text_anchor(
        &self,
        canvas: Size,
        spec: &WatermarkSpec,
        factors: ScaleFactors,
    ) -> Result<Point, WatermarkError> {
        match spec.placement {
            Placement::Absolute(point) => Ok(factors.map_point(point)),
            Placement::Anchor(anchor) => {
                let text = text_box(self.fonts, &spec.text, factors.length_scale())?;
                Ok(resolve_anchor(anchor, canvas, text))
            }
        }
    }

    /// Composite `spec` onto a copy of `canvas`, loading the logo from disk.
    pub fn compose(
        &self,
        canvas: &RasterImage,
        spec: &WatermarkSpec,
        factors: ScaleFactors,
    ) -> Result<RasterImage, WatermarkError> {
        self.compose_with_logo(canvas, spec, factors, LogoSource::Load)
    }

    /// Like [`compose`](Self::compose), with the logo supplied by the caller.
    ///
    /// A logo whose file has disappeared is skipped; the text layer still
    /// renders.
    pub fn compose_with_logo(
        &self,
        canvas: &RasterImage,
        spec: &WatermarkSpec,
        factors: ScaleFactors,
        logo: LogoSource<'_>,
    ) -> Result<RasterImage, WatermarkError> {
        spec.validate()?;

        let mut pixels = canvas.pixels().clone();
        let length_scale = factors.length_scale();

        {
            let mut painter = Painter::new(&mut pixels);

            if let Some(image_spec) = &spec.image {
                let loaded;
                let logo = match logo {
                    LogoSource::Decoded(logo) => Some(logo),
                    LogoSource::Missing => None,
                    LogoSource::Load => match load_logo(image_spec) {
                        Ok(decoded) => {
                            loaded = decoded;
                            Some(&loaded)
                        }
                        Err(WatermarkError::MissingAsset(path)) => {
                            debug!(path = %path.display(), "Logo missing, skipping image layer");
                            None
                        }
                        Err(err) => return Err(err),
                    },
                };

                if let Some(logo) = logo {
                    let size = ScaleFactors::uniform(length_scale)
                        .map_size(Size::new(image_spec.width, image_spec.height));
                    let placement = image_spec.placement.map(|p| factors.map_point(p));
                    render_image(&mut painter, logo, image_spec, size, placement)?;
                }
            }

            if !spec.text.is_empty() {
                let anchor = self.text_anchor(canvas.size(), spec, factors)?;
                render_text(&mut painter, self.fonts, &spec.text, length_scale, anchor)?;
            }
        }

        Ok(canvas.with_pixels(pixels))
    }
}
