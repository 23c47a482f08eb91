//! Stateful painter over an RGBA canvas.
//!
//! Holds a current opacity and an affine transform (translate + clockwise
//! rotate), with a save/restore stack. Every draw call blends through the
//! current opacity, so opacity set before a group of draws applies to all of
//! them until it is changed or restored.
//!
//! Axis-aligned draws are direct pixel blits. Rotated draws inverse-map each
//! canvas pixel into the source and sample it bilinearly (premultiplied).

use image::{Rgba, RgbaImage};
use tracing::trace;

/// Translate-then-rotate transform from local to canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    tx: f64,
    ty: f64,
    cos: f64,
    sin: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        tx: 0.0,
        ty: 0.0,
        cos: 1.0,
        sin: 0.0,
    };

    /// Move the local origin by `(dx, dy)` in local units.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let (x, y) = self.apply(dx, dy);
        Self {
            tx: x,
            ty: y,
            ..*self
        }
    }

    /// Rotate the local axes clockwise (y points down) by `degrees`.
    pub fn rotated(&self, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            cos: self.cos * cos - self.sin * sin,
            sin: self.sin * cos + self.cos * sin,
            ..*self
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.tx + x * self.cos - y * self.sin,
            self.ty + x * self.sin + y * self.cos,
        )
    }

    pub fn invert(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.tx;
        let dy = y - self.ty;
        (dx * self.cos + dy * self.sin, -dx * self.sin + dy * self.cos)
    }

    /// No rotation component.
    pub fn is_axis_aligned(&self) -> bool {
        self.sin.abs() < 1e-9 && self.cos > 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct PainterState {
    opacity: f32,
    transform: Transform,
}

impl Default for PainterState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            transform: Transform::IDENTITY,
        }
    }
}

/// Draws layers onto a borrowed canvas.
pub struct Painter<'a> {
    canvas: &'a mut RgbaImage,
    state: PainterState,
    stack: Vec<PainterState>,
}

impl<'a> Painter<'a> {
    pub fn new(canvas: &'a mut RgbaImage) -> Self {
        Self {
            canvas,
            state: PainterState::default(),
            stack: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    /// Push opacity and transform.
    pub fn save(&mut self) {
        self.stack.push(self.state);
    }

    /// Pop the last saved state. Unbalanced restores reset to defaults.
    pub fn restore(&mut self) {
        self.state = self.stack.pop().unwrap_or_default();
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.state.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn opacity(&self) -> f32 {
        self.state.opacity
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform = self.state.transform.translated(dx, dy);
    }

    pub fn rotate(&mut self, degrees: f64) {
        if degrees != 0.0 {
            self.state.transform = self.state.transform.rotated(degrees);
        }
    }

    /// Draw `image` with its top-left at local `(x, y)`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: f64, y: f64) {
        if image.width() == 0 || image.height() == 0 || self.state.opacity <= 0.0 {
            return;
        }

        if self.state.transform.is_axis_aligned() {
            let (cx, cy) = self.state.transform.apply(x, y);
            self.blit(image, cx.round() as i64, cy.round() as i64);
        } else {
            self.draw_transformed(image, x, y);
        }
    }

    fn blit(&mut self, image: &RgbaImage, left: i64, top: i64) {
        let canvas_w = self.canvas.width() as i64;
        let canvas_h = self.canvas.height() as i64;

        let x_start = left.max(0);
        let y_start = top.max(0);
        let x_end = (left + image.width() as i64).min(canvas_w);
        let y_end = (top + image.height() as i64).min(canvas_h);

        let opacity = self.state.opacity;
        for cy in y_start..y_end {
            for cx in x_start..x_end {
                let fg = *image.get_pixel((cx - left) as u32, (cy - top) as u32);
                if fg[3] == 0 {
                    continue;
                }
                let bg = self.canvas.get_pixel_mut(cx as u32, cy as u32);
                *bg = blend_pixels(*bg, fg, opacity);
            }
        }
    }

    fn draw_transformed(&mut self, image: &RgbaImage, x: f64, y: f64) {
        let transform = self.state.transform;
        let w = image.width() as f64;
        let h = image.height() as f64;

        let corners = [
            transform.apply(x, y),
            transform.apply(x + w, y),
            transform.apply(x, y + h),
            transform.apply(x + w, y + h),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);

        let x_start = (min_x.floor() as i64).max(0);
        let y_start = (min_y.floor() as i64).max(0);
        let x_end = (max_x.ceil() as i64).min(self.canvas.width() as i64);
        let y_end = (max_y.ceil() as i64).min(self.canvas.height() as i64);

        trace!(x_start, y_start, x_end, y_end, "Rotated draw region");

        let opacity = self.state.opacity;
        for cy in y_start..y_end {
            for cx in x_start..x_end {
                let (lx, ly) = transform.invert(cx as f64 + 0.5, cy as f64 + 0.5);
                let fg = sample_bilinear(image, lx - x - 0.5, ly - y - 0.5);
                if fg[3] == 0 {
                    continue;
                }
                let bg = self.canvas.get_pixel_mut(cx as u32, cy as u32);
                *bg = blend_pixels(*bg, fg, opacity);
            }
        }
    }
}

fn pixel_or_clear(image: &RgbaImage, x: i64, y: i64) -> [f32; 4] {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return [0.0; 4];
    }
    let p = image.get_pixel(x as u32, y as u32);
    let a = p[3] as f32 / 255.0;
    [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
}

/// Bilinear sample at continuous pixel-center coordinates, transparent
/// outside the image.
fn sample_bilinear(image: &RgbaImage, sx: f64, sy: f64) -> Rgba<u8> {
    if sx <= -1.0 || sy <= -1.0 || sx >= image.width() as f64 || sy >= image.height() as f64 {
        return Rgba([0, 0, 0, 0]);
    }

    let x0 = sx.floor() as i64;
    let y0 = sy.floor() as i64;
    let fx = (sx - x0 as f64) as f32;
    let fy = (sy - y0 as f64) as f32;

    let p00 = pixel_or_clear(image, x0, y0);
    let p10 = pixel_or_clear(image, x0 + 1, y0);
    let p01 = pixel_or_clear(image, x0, y0 + 1);
    let p11 = pixel_or_clear(image, x0 + 1, y0 + 1);

    let mut out = [0.0f32; 4];
    for (c, value) in out.iter_mut().enumerate() {
        *value = p00[c] * (1.0 - fx) * (1.0 - fy)
            + p10[c] * fx * (1.0 - fy)
            + p01[c] * (1.0 - fx) * fy
            + p11[c] * fx * fy;
    }

    let alpha = out[3];
    if alpha < 0.5 {
        return Rgba([0, 0, 0, 0]);
    }
    let unpremultiply = |v: f32| (v * 255.0 / alpha).round().clamp(0.0, 255.0) as u8;
    Rgba([
        unpremultiply(out[0]),
        unpremultiply(out[1]),
        unpremultiply(out[2]),
        alpha.round().clamp(0.0, 255.0) as u8,
    ])
}

/// Blend two pixels using alpha compositing with additional opacity.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
pub fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let fg_alpha = (foreground[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
