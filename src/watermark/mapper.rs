//! Coordinate mapping between canvas spaces.
//!
//! A watermark is authored against one canvas (usually the preview pixmap)
//! and drawn onto others (the full-resolution original, or a resized export
//! target). [`scale_factors`] computes how lengths and positions translate
//! between two sizes:
//!
//! - [`FitMode::Uniform`] gives one scalar `min(tw/sw, th/sh)` for both
//!   axes ("contain" fitting, never crops).
//! - [`FitMode::Independent`] gives `tw/sw` and `th/sh` separately. This is
//!   what position mapping uses; the two axes may drift apart slightly when
//!   a preview's rounded size no longer matches the original's aspect ratio.
//!
//! Lengths that scale with the canvas (font size, shadow offset, logo box)
//! use [`ScaleFactors::length_scale`], i.e. `max(sx, sy)`.

use serde::{Deserialize, Serialize};

use super::WatermarkError;
use crate::geometry::{Point, Size};

/// How two canvas sizes are related.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    Uniform,
    Independent,
}

/// Per-axis scale from one canvas space to another.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ScaleFactors {
    pub const IDENTITY: ScaleFactors = ScaleFactors { x: 1.0, y: 1.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn uniform(scale: f64) -> Self {
        Self { x: scale, y: scale }
    }

    /// Single multiplier for canvas-relative lengths.
    pub fn length_scale(&self) -> f64 {
        self.x.max(self.y)
    }

    /// Map a position, rounding to the nearest pixel.
    pub fn map_point(&self, point: Point) -> Point {
        Point::new(
            (point.x as f64 * self.x).round() as i32,
            (point.y as f64 * self.y).round() as i32,
        )
    }

    /// Map a movement. Truncates toward zero so small jitters do not move
    /// the anchor.
    pub fn map_delta(&self, delta: Point) -> Point {
        Point::new(
            (delta.x as f64 * self.x) as i32,
            (delta.y as f64 * self.y) as i32,
        )
    }

    pub fn map_length(&self, length: f64) -> f64 {
        length * self.length_scale()
    }

    /// Map a size per axis, rounding and keeping each side at least 1.
    pub fn map_size(&self, size: Size) -> Size {
        Size::new(
            ((size.width as f64 * self.x).round() as u32).max(1),
            ((size.height as f64 * self.y).round() as u32).max(1),
        )
    }

    /// Compose: first `self`, then `next`.
    pub fn then(&self, next: ScaleFactors) -> ScaleFactors {
        ScaleFactors::new(self.x * next.x, self.y * next.y)
    }

    pub fn inverse(&self) -> ScaleFactors {
        ScaleFactors::new(1.0 / self.x, 1.0 / self.y)
    }
}

fn ensure_non_degenerate(size: Size) -> Result<(), WatermarkError> {
    if size.is_empty() {
        Err(WatermarkError::DegenerateSize {
            width: size.width,
            height: size.height,
        })
    } else {
        Ok(())
    }
}

/// Compute the scale factors that carry `source` space into `target` space.
///
/// Fails with [`WatermarkError::DegenerateSize`] if `source` has a zero side.
pub fn scale_factors(
    source: Size,
    target: Size,
    fit: FitMode,
) -> Result<ScaleFactors, WatermarkError> {
    ensure_non_degenerate(source)?;

    let sx = target.width as f64 / source.width as f64;
    let sy = target.height as f64 / source.height as f64;

    Ok(match fit {
        FitMode::Uniform => ScaleFactors::uniform(sx.min(sy)),
        FitMode::Independent => ScaleFactors::new(sx, sy),
    })
}

/// Canvas space a watermark spec's coordinates were authored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "snake_case")]
pub enum ReferenceSpace {
    /// Coordinates are pixels of the source image itself.
    Source,
    /// Coordinates were authored on a preview fitted (contain) into these
    /// bounds; the preview size is recomputed per source image.
    Preview { bounds: Size },
    /// Coordinates were authored on a canvas of exactly this size.
    Fixed { size: Size },
}

impl ReferenceSpace {
    /// Size of the authoring canvas for a given source image.
    pub fn reference_size(&self, source: Size) -> Result<Size, WatermarkError> {
        match *self {
            ReferenceSpace::Source => Ok(source),
            ReferenceSpace::Preview { bounds } => {
                source
                    .fit_within(bounds)
                    .ok_or(WatermarkError::DegenerateSize {
                        width: source.width,
                        height: source.height,
                    })
            }
            ReferenceSpace::Fixed { size } => Ok(size),
        }
    }

    /// Factors from the authoring space to a `target` canvas that was
    /// derived from a `source` image.
    pub fn factors_to(&self, source: Size, target: Size) -> Result<ScaleFactors, WatermarkError> {
        let reference = self.reference_size(source)?;
        scale_factors(reference, target, FitMode::Independent)
    }
}

/// A `content` pixmap shown centered inside a `widget`, scaled to fit.
///
/// Used to translate pointer positions in the preview widget into pixmap
/// pixels and back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    widget: Size,
    content: Size,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    pub fn new(widget: Size, content: Size) -> Result<Self, WatermarkError> {
        ensure_non_degenerate(widget)?;
        let scale = scale_factors(content, widget, FitMode::Uniform)?.x;

        let shown_w = content.width as f64 * scale;
        let shown_h = content.height as f64 * scale;
        let offset_x = ((widget.width as f64 - shown_w) / 2.0).floor().max(0.0);
        let offset_y = ((widget.height as f64 - shown_h) / 2.0).floor().max(0.0);

        Ok(Self {
            widget,
            content,
            scale,
            offset_x,
            offset_y,
        })
    }

    /// Widget pixels per content pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Top-left of the pixmap inside the widget.
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x as i32, self.offset_y as i32)
    }

    pub fn content(&self) -> Size {
        self.content
    }

    /// Size the pixmap occupies on screen.
    pub fn displayed_size(&self) -> Size {
        Size::new(
            ((self.content.width as f64 * self.scale).round() as u32).max(1),
            ((self.content.height as f64 * self.scale).round() as u32).max(1),
        )
    }

    /// Factors carrying widget-space movements into pixmap pixels.
    pub fn widget_to_content(&self) -> ScaleFactors {
        ScaleFactors::uniform(1.0 / self.scale)
    }

    /// Map a pixmap point into widget coordinates.
    pub fn to_widget(&self, point: Point) -> (f64, f64) {
        (
            self.offset_x + point.x as f64 * self.scale,
            self.offset_y + point.y as f64 * self.scale,
        )
    }

    /// Map a widget point into pixmap coordinates.
    pub fn to_content(&self, point: Point) -> Point {
        Point::new(
            ((point.x as f64 - self.offset_x) / self.scale).round() as i32,
            ((point.y as f64 - self.offset_y) / self.scale).round() as i32,
        )
    }
}
