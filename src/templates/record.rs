//! Persisted template records.
//!
//! The on-disk shape is a flat JSON object per template. Fields this crate
//! does not know are kept in `extra` and written back unchanged.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::error::TemplateError;
use crate::geometry::Point;
use crate::watermark::{
    parse_hex_color, Anchor, Color, FontDescriptor, ImageWatermarkSpec, Placement,
    TextWatermarkSpec, WatermarkSpec,
};

/// Timestamp layout used for every `*_time` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const DEFAULT_TEMPLATE_NAME: &str = "默认模板";
pub const DEFAULT_TEMPLATE_TEXT: &str = "水印文本";

pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `watermark_position`: either `[x, y]` or an anchor name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredPosition {
    Point([i32; 2]),
    Named(String),
}

impl StoredPosition {
    pub fn to_placement(&self) -> Result<Placement, TemplateError> {
        match self {
            StoredPosition::Point([x, y]) => Ok(Placement::Absolute(Point::new(*x, *y))),
            StoredPosition::Named(name) => name
                .parse::<Anchor>()
                .map(Placement::Anchor)
                .map_err(|err| TemplateError::InvalidRecord(err.to_string())),
        }
    }
}

impl From<Placement> for StoredPosition {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Absolute(point) => StoredPosition::Point([point.x, point.y]),
            Placement::Anchor(anchor) => StoredPosition::Named(anchor.as_str().to_string()),
        }
    }
}

impl fmt::Display for StoredPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredPosition::Point([x, y]) => write!(f, "({}, {})", x, y),
            StoredPosition::Named(name) => f.write_str(name),
        }
    }
}

fn default_font_family() -> String {
    "Arial".to_string()
}

fn default_font_size() -> f32 {
    24.0
}

fn default_font_color() -> String {
    "#000000".to_string()
}

fn default_stroke_color() -> String {
    "#ffffff".to_string()
}

fn default_opacity() -> u8 {
    80
}

fn default_position() -> StoredPosition {
    StoredPosition::Named(Anchor::BottomRight.as_str().to_string())
}

fn default_true() -> bool {
    true
}

fn default_image_side() -> u32 {
    100
}

/// One saved watermark setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub watermark_text: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub font_bold: bool,
    #[serde(default)]
    pub font_italic: bool,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default)]
    pub font_shadow: bool,
    #[serde(default)]
    pub font_stroke: bool,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_opacity")]
    pub watermark_opacity: u8,
    #[serde(default)]
    pub watermark_rotation: f32,
    #[serde(default = "default_position")]
    pub watermark_position: StoredPosition,
    #[serde(default)]
    pub watermark_x: i32,
    #[serde(default)]
    pub watermark_y: i32,

    #[serde(default)]
    pub enable_image_watermark: bool,
    #[serde(default)]
    pub image_watermark_path: String,
    #[serde(default = "default_opacity")]
    pub image_opacity: u8,
    #[serde(default = "default_true")]
    pub proportional_scale: bool,
    #[serde(default = "default_image_side")]
    pub image_width: u32,
    #[serde(default = "default_image_side")]
    pub image_height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_watermark_position: Option<[i32; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_time: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for TemplateRecord {
    fn default() -> Self {
        Self {
            name: None,
            watermark_text: String::new(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_bold: false,
            font_italic: false,
            font_color: default_font_color(),
            font_shadow: false,
            font_stroke: false,
            stroke_color: default_stroke_color(),
            watermark_opacity: default_opacity(),
            watermark_rotation: 0.0,
            watermark_position: default_position(),
            watermark_x: 0,
            watermark_y: 0,
            enable_image_watermark: false,
            image_watermark_path: String::new(),
            image_opacity: default_opacity(),
            proportional_scale: true,
            image_width: default_image_side(),
            image_height: default_image_side(),
            image_watermark_position: None,
            created_time: None,
            updated_time: None,
            imported_time: None,
            saved_time: None,
            extra: BTreeMap::new(),
        }
    }
}

fn color_field(field: &str, value: &str) -> Result<Color, TemplateError> {
    parse_hex_color(value)
        .map_err(|_| TemplateError::InvalidRecord(format!("{} '{}' is not a colour", field, value)))
}

impl TemplateRecord {
    /// The built-in starting template, timestamped now.
    pub fn default_template() -> Self {
        let now = timestamp();
        Self {
            name: Some(DEFAULT_TEMPLATE_NAME.to_string()),
            watermark_text: DEFAULT_TEMPLATE_TEXT.to_string(),
            created_time: Some(now.clone()),
            updated_time: Some(now),
            ..Self::default()
        }
    }

    /// Record for the current state of a watermark spec.
    pub fn from_spec(spec: &WatermarkSpec) -> Self {
        let text = &spec.text;
        let mut record = Self {
            watermark_text: text.text.clone(),
            font_family: text.font.family.clone(),
            font_size: text.font.point_size,
            font_bold: text.font.bold,
            font_italic: text.font.italic,
            font_color: text.color.to_hex(),
            font_shadow: text.shadow,
            font_stroke: text.stroke,
            stroke_color: text.effective_stroke_color().to_hex(),
            watermark_opacity: text.opacity,
            watermark_rotation: text.rotation,
            watermark_position: spec.placement.into(),
            ..Self::default()
        };
        if let Placement::Absolute(point) = spec.placement {
            record.watermark_x = point.x;
            record.watermark_y = point.y;
        }

        if let Some(image) = &spec.image {
            record.enable_image_watermark = true;
            record.image_watermark_path = image.path.display().to_string();
            record.image_opacity = image.opacity;
            record.proportional_scale = image.proportional;
            record.image_width = image.width;
            record.image_height = image.height;
            record.image_watermark_position = image.placement.map(|p| [p.x, p.y]);
        }
        record
    }

    /// The watermark spec this record describes.
    ///
    /// The image layer is included only when enabled with a non-empty path.
    pub fn to_spec(&self) -> Result<WatermarkSpec, TemplateError> {
        let font = FontDescriptor::new(self.font_family.clone(), self.font_size)
            .bold(self.font_bold)
            .italic(self.font_italic);
        let text = TextWatermarkSpec {
            font,
            color: color_field("font_color", &self.font_color)?,
            opacity: self.watermark_opacity,
            shadow: self.font_shadow,
            stroke: self.font_stroke,
            stroke_color: Some(color_field("stroke_color", &self.stroke_color)?),
            rotation: self.watermark_rotation,
            ..TextWatermarkSpec::new(self.watermark_text.clone())
        };

        let mut spec = WatermarkSpec::new(text, self.watermark_position.to_placement()?);
        if self.enable_image_watermark && !self.image_watermark_path.trim().is_empty() {
            spec = spec.with_image(ImageWatermarkSpec {
                proportional: self.proportional_scale,
                opacity: self.image_opacity,
                placement: self
                    .image_watermark_position
                    .map(|[x, y]| Point::new(x, y)),
                ..ImageWatermarkSpec::new(
                    PathBuf::from(self.image_watermark_path.trim()),
                    self.image_width,
                    self.image_height,
                )
            });
        }

        spec.validate()
            .map_err(|err| TemplateError::InvalidRecord(err.to_string()))?;
        Ok(spec)
    }

    /// Summary shown in template listings.
    pub fn info(&self, key: &str) -> TemplateInfo {
        TemplateInfo {
            name: self.name.clone().unwrap_or_else(|| key.to_string()),
            created_time: self.created_time.clone(),
            updated_time: self.updated_time.clone(),
            has_text_watermark: !self.watermark_text.is_empty(),
            has_image_watermark: self.enable_image_watermark,
            watermark_position: self.watermark_position.to_string(),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            opacity: self.watermark_opacity,
            rotation: self.watermark_rotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub created_time: Option<String>,
    pub updated_time: Option<String>,
    pub has_text_watermark: bool,
    pub has_image_watermark: bool,
    pub watermark_position: String,
    pub font_family: String,
    pub font_size: f32,
    pub opacity: u8,
    pub rotation: f32,
}
