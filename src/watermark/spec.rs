//! Watermark specifications.
//!
//! Fully populated value objects handed to the renderers. A spec carries
//! every field a render needs; nothing is looked up from ambient state.
//!
//! Coordinates inside a spec (absolute placements, logo positions) are
//! expressed in whatever canvas space the spec was authored in. Use
//! [`super::mapper::ReferenceSpace`] to carry them onto another canvas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::position::Anchor;
use super::WatermarkError;
use crate::geometry::Point;

/// Shadow offset in pixels at unit scale.
pub const SHADOW_OFFSET: f64 = 2.0;

/// Fixed shadow colour.
pub const SHADOW_COLOR: Color = Color::rgba(128, 128, 128, 180);

/// Stroke colour used when a spec does not override it.
pub const DEFAULT_STROKE_COLOR: Color = Color::rgb(255, 255, 255);

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_rgba(&self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = WatermarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex_color(s)
    }
}

impl TryFrom<String> for Color {
    type Error = WatermarkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_hex_color(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

fn hex_digits(s: &str) -> Result<u8, WatermarkError> {
    u8::from_str_radix(s, 16)
        .map_err(|_| WatermarkError::ConfigError(format!("Invalid hex digits '{}'", s)))
}

/// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
pub fn parse_hex_color(hex: &str) -> Result<Color, WatermarkError> {
    let digits = hex
        .trim()
        .strip_prefix('#')
        .ok_or_else(|| WatermarkError::ConfigError("Color must start with '#'".to_string()))?;

    if !digits.is_ascii() {
        return Err(WatermarkError::ConfigError(format!(
            "Invalid color '{}'",
            hex
        )));
    }

    match digits.len() {
        3 => {
            // Each digit doubled: 0xF -> 0xFF
            let r = hex_digits(&digits[0..1])?;
            let g = hex_digits(&digits[1..2])?;
            let b = hex_digits(&digits[2..3])?;
            Ok(Color::rgb(r * 17, g * 17, b * 17))
        }
        6 => Ok(Color::rgb(
            hex_digits(&digits[0..2])?,
            hex_digits(&digits[2..4])?,
            hex_digits(&digits[4..6])?,
        )),
        8 => Ok(Color::rgba(
            hex_digits(&digits[0..2])?,
            hex_digits(&digits[2..4])?,
            hex_digits(&digits[4..6])?,
            hex_digits(&digits[6..8])?,
        )),
        n => Err(WatermarkError::ConfigError(format!(
            "Color must be #RGB, #RRGGBB or #RRGGBBAA, got {} digits",
            n
        ))),
    }
}

/// Font request: family name, size in points and style flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: String,
    pub point_size: f32,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, point_size: f32) -> Self {
        Self {
            family: family.into(),
            point_size,
            bold: false,
            italic: false,
        }
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Rendered pixel size on a canvas scaled by `length_scale`.
    pub fn pixel_size(&self, length_scale: f64) -> f32 {
        (self.point_size as f64 * super::text_renderer::POINTS_TO_PIXELS * length_scale) as f32
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::new("Arial", 24.0)
    }
}

/// Text layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextWatermarkSpec {
    pub text: String,
    #[serde(default)]
    pub font: FontDescriptor,
    #[serde(default = "Color::black")]
    pub color: Color,
    /// 0-100, applied on top of the colour's own alpha.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub shadow: bool,
    #[serde(default)]
    pub stroke: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    /// Degrees clockwise around the anchor point.
    #[serde(default)]
    pub rotation: f32,
}

fn default_opacity() -> u8 {
    80
}

impl TextWatermarkSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font: FontDescriptor::default(),
            color: Color::black(),
            opacity: default_opacity(),
            shadow: false,
            stroke: false,
            stroke_color: None,
            rotation: 0.0,
        }
    }

    /// Nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Opacity as a 0.0-1.0 painter factor.
    pub fn opacity_factor(&self) -> f32 {
        self.opacity.min(100) as f32 / 100.0
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f32 {
        self.rotation.rem_euclid(360.0)
    }

    pub fn effective_stroke_color(&self) -> Color {
        self.stroke_color.unwrap_or(DEFAULT_STROKE_COLOR)
    }
}

/// Logo layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageWatermarkSpec {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_true")]
    pub proportional: bool,
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    /// Top-left of the logo. `None` means top-right with a fixed margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Point>,
}

fn default_true() -> bool {
    true
}

impl ImageWatermarkSpec {
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            proportional: true,
            opacity: default_opacity(),
            placement: None,
        }
    }

    pub fn opacity_factor(&self) -> f32 {
        self.opacity.min(100) as f32 / 100.0
    }
}

/// Where the text layer goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Baseline-left point in canvas space.
    Absolute(Point),
    /// Named grid cell, resolved against the canvas on every render.
    Anchor(Anchor),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Anchor(Anchor::BottomRight)
    }
}

/// One text layer and an optional logo layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    pub text: TextWatermarkSpec,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageWatermarkSpec>,
}

impl WatermarkSpec {
    pub fn new(text: TextWatermarkSpec, placement: Placement) -> Self {
        Self {
            text,
            placement,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageWatermarkSpec) -> Self {
        self.image = Some(image);
        self
    }

    /// Check ranges a renderer relies on.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if self.text.opacity > 100 {
            return Err(WatermarkError::ConfigError(format!(
                "Text opacity must be 0-100, got {}",
                self.text.opacity
            )));
        }
        let size = self.text.font.point_size;
        if size.is_nan() || size <= 0.0 {
            return Err(WatermarkError::ConfigError(format!(
                "Font size must be positive, got {}",
                self.text.font.point_size
            )));
        }
        if let Some(image) = &self.image {
            if image.opacity > 100 {
                return Err(WatermarkError::ConfigError(format!(
                    "Image opacity must be 0-100, got {}",
                    image.opacity
                )));
            }
            if image.width == 0 || image.height == 0 {
                return Err(WatermarkError::ConfigError(format!(
                    "Image watermark size must be non-zero, got {}x{}",
                    image.width, image.height
                )));
            }
        }
        Ok(())
    }
}
