//! Text watermark rendering.
//!
//! The glyph run is rasterized once into a coverage mask, then tinted and
//! drawn up to three times through the painter:
//!
//! 1. shadow, offset by `(+2, +2)` scaled, in fixed semi-transparent gray
//! 2. stroke, at the anchor, in the stroke colour, with the same coverage
//!    as the fill (a second copy under it, not an outline)
//! 3. fill, at the anchor, in the text colour
//!
//! All three share one transform: the painter is translated to the anchor
//! and rotated by the spec's rotation, so every draw is at local `(0, 0)`.
//! The spec's opacity is painter state and applies to all three.
//!
//! The anchor is the left end of the text baseline.
//!
//! # Example
//!
//! ```ignore
//! use filigree::watermark::{render_text, FontBook, Painter, TextWatermarkSpec};
//!
//! let fonts = FontBook::system("DejaVu Sans");
//! let mut painter = Painter::new(&mut canvas);
//! render_text(&mut painter, &fonts, &TextWatermarkSpec::new("© 2025"), 1.0, anchor)?;
//! ```

use ab_glyph::{point, Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::font::FontBook;
use super::painter::Painter;
use super::spec::{Color, TextWatermarkSpec, SHADOW_COLOR, SHADOW_OFFSET};
use super::WatermarkError;
use crate::geometry::{Point, Size};

/// Font sizes are in points; canvases are rendered at 96 DPI.
pub const POINTS_TO_PIXELS: f64 = 96.0 / 72.0;

/// Horizontal advance and vertical extent of a glyph run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextMetrics {
    /// Advance width including kerning.
    pub width: u32,
    /// Pixels above the baseline.
    pub ascent: u32,
    /// Pixels below the baseline.
    pub descent: u32,
}

impl TextMetrics {
    pub fn height(&self) -> u32 {
        self.ascent + self.descent
    }

    /// Width by line height; the box used for anchoring and hit-testing.
    pub fn bounding_box(&self) -> Size {
        Size::new(self.width, self.height())
    }
}

fn drawable(c: char) -> bool {
    !c.is_control()
}

/// Measure `text` at `px_size` pixels.
pub fn measure_text<F: Font>(font: &F, px_size: f32, text: &str) -> TextMetrics {
    let scaled = font.as_scaled(PxScale::from(px_size));

    let mut width = 0.0f32;
    let mut prev_glyph: Option<ab_glyph::GlyphId> = None;
    for c in text.chars().filter(|c| drawable(*c)) {
        let glyph_id = scaled.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    TextMetrics {
        width: width.max(0.0).ceil() as u32,
        ascent: scaled.ascent().max(0.0).ceil() as u32,
        descent: (-scaled.descent()).max(0.0).ceil() as u32,
    }
}

/// Antialiased coverage of a glyph run.
///
/// `origin` is the offset of the mask's top-left from the baseline-left
/// point of the run.
#[derive(Debug, Clone)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    coverage: Vec<f32>,
    origin: (f64, f64),
}

/// Cell count of a `width x height` mask, computed without `u32` overflow.
fn mask_len(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Row-major index of `(x, y)` in a mask `width` cells wide.
fn mask_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

impl GlyphMask {
    pub fn rasterize<F: Font>(font: &F, px_size: f32, text: &str) -> Self {
        let scale = PxScale::from(px_size);
        let scaled = font.as_scaled(scale);

        let mut outlines = Vec::new();
        let mut caret = 0.0f32;
        let mut prev_glyph: Option<ab_glyph::GlyphId> = None;
        for c in text.chars().filter(|c| drawable(*c)) {
            let glyph_id = scaled.glyph_id(c);
            if let Some(prev) = prev_glyph {
                caret += scaled.kern(prev, glyph_id);
            }
            let glyph = glyph_id.with_scale_and_position(scale, point(caret, 0.0));
            caret += scaled.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                outlines.push(outlined);
            }
        }

        if outlines.is_empty() {
            return Self {
                width: 0,
                height: 0,
                coverage: Vec::new(),
                origin: (0.0, 0.0),
            };
        }

        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for outlined in &outlines {
            let bounds = outlined.px_bounds();
            min_x = min_x.min(bounds.min.x);
            min_y = min_y.min(bounds.min.y);
            max_x = max_x.max(bounds.max.x);
            max_y = max_y.max(bounds.max.y);
        }
        let min_x = min_x.floor() as i32;
        let min_y = min_y.floor() as i32;
        let width = (max_x.ceil() as i32 - min_x).max(1) as u32;
        let height = (max_y.ceil() as i32 - min_y).max(1) as u32;

        let mut coverage = vec![0.0f32; mask_len(width, height)];
        for outlined in &outlines {
            let bounds = outlined.px_bounds();
            let left = bounds.min.x as i32 - min_x;
            let top = bounds.min.y as i32 - min_y;
            outlined.draw(|px, py, c| {
                let x = left + px as i32;
                let y = top + py as i32;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    let cell = &mut coverage[mask_index(x as u32, y as u32, width)];
                    *cell = (*cell + c).min(1.0);
                }
            });
        }

        Self {
            width,
            height,
            coverage,
            origin: (min_x as f64, min_y as f64),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn origin(&self) -> (f64, f64) {
        self.origin
    }

    /// Solid-colour layer with the mask as alpha.
    pub fn tint(&self, color: Color) -> RgbaImage {
        let mut layer = RgbaImage::new(self.width, self.height);
        for (i, pixel) in layer.pixels_mut().enumerate() {
            let alpha = (self.coverage[i] * color.a as f32).round() as u8;
            *pixel = Rgba([color.r, color.g, color.b, alpha]);
        }
        layer
    }
}

/// Bounding box of the spec's text on a canvas scaled by `length_scale`.
///
/// Empty text measures as `0x0` without touching the font book.
pub fn text_box(
    fonts: &FontBook,
    spec: &TextWatermarkSpec,
    length_scale: f64,
) -> Result<Size, WatermarkError> {
    if spec.is_empty() {
        return Ok(Size::default());
    }
    let font = fonts.resolve(&spec.font)?;
    Ok(measure_text(&*font, spec.font.pixel_size(length_scale), &spec.text).bounding_box())
}

/// Draw a text watermark with its baseline-left at `anchor`.
///
/// `length_scale` multiplies the font size and the shadow offset. Empty text
/// draws nothing.
pub fn render_text(
    painter: &mut Painter<'_>,
    fonts: &FontBook,
    spec: &TextWatermarkSpec,
    length_scale: f64,
    anchor: Point,
) -> Result<(), WatermarkError> {
    if spec.is_empty() {
        return Ok(());
    }

    let font = fonts.resolve(&spec.font)?;
    let px_size = spec.font.pixel_size(length_scale);
    let mask = GlyphMask::rasterize(&*font, px_size, &spec.text);
    if mask.is_empty() {
        debug!(text = %spec.text, "Text produced no visible glyphs");
        return Ok(());
    }
    let (ox, oy) = mask.origin();

    painter.save();
    painter.set_opacity(spec.opacity_factor());
    painter.translate(anchor.x as f64, anchor.y as f64);
    painter.rotate(spec.normalized_rotation() as f64);

    if spec.shadow {
        let offset = SHADOW_OFFSET * length_scale;
        painter.draw_image(&mask.tint(SHADOW_COLOR), ox + offset, oy + offset);
    }

    if spec.stroke {
        debug!(color = %spec.effective_stroke_color(), "Drawing stroke pass");
        painter.draw_image(&mask.tint(spec.effective_stroke_color()), ox, oy);
    }

    painter.draw_image(&mask.tint(spec.color), ox, oy);
    painter.restore();

    debug!(
        x = anchor.x,
        y = anchor.y,
        px_size,
        rotation = spec.rotation,
        "Rendered text watermark"
    );
    Ok(())
}
