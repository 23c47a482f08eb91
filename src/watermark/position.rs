//! Anchor grid positioning for text watermarks.
//!
//! Text is drawn from its baseline, so vertical anchors compensate with the
//! text height: the top row puts the glyph top on the 5% line, the middle
//! row centers the box, and the bottom row sits the baseline on the 95% line.
//!
//! | column | x                         |
//! |--------|---------------------------|
//! | 0      | `W * 0.05`                |
//! | 1      | `(W - textW) / 2`         |
//! | 2      | `W * 0.95 - textW`        |
//!
//! | row | y (baseline)        |
//! |-----|---------------------|
//! | 0   | `H * 0.05 + textH`  |
//! | 1   | `(H + textH) / 2`   |
//! | 2   | `H * 0.95`          |
//!
//! Results depend on the canvas size and on the measured text box, so they
//! are resolved on every render rather than stored.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::mapper::{ScaleFactors, Viewport};
use super::WatermarkError;
use crate::geometry::{Point, Rect, Size};

/// Fraction of the canvas kept free along each edge.
pub const EDGE_PADDING_RATIO: f64 = 0.05;

/// Extra pixels around the text box that still count as a hit.
pub const HIT_SLOP: u32 = 10;

/// One of the nine grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[serde(alias = "top-left")]
    TopLeft,
    #[serde(alias = "top-center")]
    TopCenter,
    #[serde(alias = "top-right")]
    TopRight,
    #[serde(alias = "mid-left", alias = "center_left", alias = "center-left")]
    MidLeft,
    Center,
    #[serde(alias = "mid-right", alias = "center_right", alias = "center-right")]
    MidRight,
    #[serde(alias = "bottom-left")]
    BottomLeft,
    #[serde(alias = "bottom-center")]
    BottomCenter,
    #[serde(alias = "bottom-right")]
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MidLeft,
        Anchor::Center,
        Anchor::MidRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Anchor for a `(row, col)` grid cell, both in `0..=2`.
    pub fn from_cell(row: u8, col: u8) -> Option<Anchor> {
        if row > 2 || col > 2 {
            return None;
        }
        Some(Self::ALL[(row * 3 + col) as usize])
    }

    /// `(row, col)` of this anchor.
    pub fn cell(&self) -> (u8, u8) {
        let index = Self::ALL.iter().position(|a| a == self).unwrap_or(4) as u8;
        (index / 3, index % 3)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top_left",
            Self::TopCenter => "top_center",
            Self::TopRight => "top_right",
            Self::MidLeft => "mid_left",
            Self::Center => "center",
            Self::MidRight => "mid_right",
            Self::BottomLeft => "bottom_left",
            Self::BottomCenter => "bottom_center",
            Self::BottomRight => "bottom_right",
        }
    }
}

impl FromStr for Anchor {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        let normalized = match normalized.as_str() {
            "center_left" => "mid_left",
            "center_right" => "mid_right",
            other => other,
        };
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == normalized)
            .ok_or_else(|| WatermarkError::ConfigError(format!("unknown anchor: {}", s)))
    }
}

/// Baseline-left point for text of size `text` anchored at `anchor`.
///
/// Coordinates are truncated toward zero.
pub fn resolve_anchor(anchor: Anchor, canvas: Size, text: Size) -> Point {
    let (row, col) = anchor.cell();
    let canvas_w = canvas.width as f64;
    let canvas_h = canvas.height as f64;
    let text_w = text.width as f64;
    let text_h = text.height as f64;

    let x = match col {
        0 => canvas_w * EDGE_PADDING_RATIO,
        1 => (canvas_w - text_w) / 2.0,
        _ => canvas_w * (1.0 - EDGE_PADDING_RATIO) - text_w,
    };

    let y = match row {
        0 => canvas_h * EDGE_PADDING_RATIO + text_h,
        1 => (canvas_h + text_h) / 2.0,
        _ => canvas_h * (1.0 - EDGE_PADDING_RATIO),
    };

    Point::new(x as i32, y as i32)
}

/// [`resolve_anchor`] addressed by raw grid cell.
pub fn resolve_cell(row: u8, col: u8, canvas: Size, text: Size) -> Result<Point, WatermarkError> {
    let anchor = Anchor::from_cell(row, col).ok_or(WatermarkError::InvalidGridCell { row, col })?;
    Ok(resolve_anchor(anchor, canvas, text))
}

/// Unrotated text box for a baseline-left anchor point.
pub fn text_bounds(anchor: Point, text: Size) -> Rect {
    Rect::new(anchor.x, anchor.y - text.height as i32, text.width, text.height)
}

/// Area of the preview widget that grabs the text for dragging.
///
/// `anchor` and `text` are in pixmap pixels; the result is in widget pixels,
/// grown by [`HIT_SLOP`] on every side.
pub fn hit_rect(viewport: &Viewport, anchor: Point, text: Size) -> Rect {
    let bounds = text_bounds(anchor, text);
    let (left, top) = viewport.to_widget(Point::new(bounds.x, bounds.y));
    let scale = viewport.scale();

    Rect::new(
        left as i32,
        top as i32,
        (text.width as f64 * scale) as u32,
        (text.height as f64 * scale) as u32,
    )
    .expanded(HIT_SLOP)
}

/// An in-progress drag of the text watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragGesture {
    start_pointer: Point,
    start_anchor: Point,
}

impl DragGesture {
    pub fn begin(pointer: Point, anchor: Point) -> Self {
        Self {
            start_pointer: pointer,
            start_anchor: anchor,
        }
    }

    pub fn start_anchor(&self) -> Point {
        self.start_anchor
    }

    /// New anchor for the current pointer. `factors` converts pointer-space
    /// movement into anchor-space movement.
    pub fn moved_to(&self, pointer: Point, factors: ScaleFactors) -> Point {
        self.start_anchor + factors.map_delta(pointer - self.start_pointer)
    }
}
