//! Integer geometry shared by every canvas space (original image, preview
//! pixmap, export target).

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Pixel dimensions of a canvas or of a watermark element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, `None` for an empty size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }

    /// Largest size with this aspect ratio that fits inside `bounds`.
    ///
    /// Scales up as well as down ("contain" semantics). Each side is rounded
    /// and kept at least one pixel. Returns `None` when either size is empty.
    pub fn fit_within(&self, bounds: Size) -> Option<Size> {
        if self.is_empty() || bounds.is_empty() {
            return None;
        }
        let scale = (bounds.width as f64 / self.width as f64)
            .min(bounds.height as f64 / self.height as f64);
        Some(Size::new(
            ((self.width as f64 * scale).round() as u32).max(1),
            ((self.height as f64 * scale).round() as u32).max(1),
        ))
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A point in some canvas space. May be negative or beyond the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Half-open containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Grow the rectangle by `margin` pixels on every side.
    pub fn expanded(&self, margin: u32) -> Rect {
        Rect::new(
            self.x - margin as i32,
            self.y - margin as i32,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// True when the whole rectangle lies inside a canvas of `size`.
    pub fn is_within(&self, size: Size) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= size.width as i32
            && self.bottom() <= size.height as i32
    }
}
