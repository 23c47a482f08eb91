//! Output canvas sizing.
//!
//! Applied to the source before compositing for export. Keep-aspect custom
//! sizing shrinks the canvas to the content; there is no letterboxing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::error::EncodeError;
use crate::error::Result;
use crate::geometry::Size;
use crate::raster::RasterImage;

/// Allowed percentage range.
pub const PERCENT_RANGE: std::ops::RangeInclusive<u32> = 1..=500;

/// How the export canvas is sized relative to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizingPolicy {
    #[default]
    Original,
    Percentage {
        percent: u32,
    },
    Custom {
        width: u32,
        height: u32,
        #[serde(default)]
        keep_aspect_ratio: bool,
    },
}

fn scaled(value: u32, factor: f64) -> u32 {
    ((value as f64 * factor).round() as u32).max(1)
}

impl SizingPolicy {
    pub fn validate(&self) -> std::result::Result<(), EncodeError> {
        match *self {
            SizingPolicy::Original => Ok(()),
            SizingPolicy::Percentage { percent } => {
                if PERCENT_RANGE.contains(&percent) {
                    Ok(())
                } else {
                    Err(EncodeError::invalid(format!(
                        "percentage must be 1-500, got {}",
                        percent
                    )))
                }
            }
            SizingPolicy::Custom { width, height, .. } => {
                if width == 0 || height == 0 {
                    Err(EncodeError::invalid(format!(
                        "custom size must be non-zero, got {}x{}",
                        width, height
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Final canvas size for a source of `original` size.
    pub fn target_size(&self, original: Size) -> std::result::Result<Size, EncodeError> {
        self.validate()?;
        if original.is_empty() {
            return Err(EncodeError::invalid(format!(
                "cannot size an empty {} source",
                original
            )));
        }

        Ok(match *self {
            SizingPolicy::Original => original,
            SizingPolicy::Percentage { percent } => {
                let factor = percent as f64 / 100.0;
                Size::new(
                    scaled(original.width, factor),
                    scaled(original.height, factor),
                )
            }
            SizingPolicy::Custom {
                width,
                height,
                keep_aspect_ratio: false,
            } => Size::new(width, height),
            SizingPolicy::Custom {
                width,
                height,
                keep_aspect_ratio: true,
            } => {
                let target_ratio = width as f64 / height as f64;
                let original_ratio = original.width as f64 / original.height as f64;
                if target_ratio > original_ratio {
                    Size::new(scaled(height, original_ratio), height)
                } else {
                    let factor = original.height as f64 / original.width as f64;
                    Size::new(width, scaled(width, factor))
                }
            }
        })
    }
}

/// `original`, `<n>%`, `<w>x<h>` (fit inside, aspect kept) or `<w>x<h>!`
/// (stretched).
impl FromStr for SizingPolicy {
    type Err = EncodeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || EncodeError::invalid(format!("unknown sizing '{}'", s));

        let policy = if s.eq_ignore_ascii_case("original") {
            SizingPolicy::Original
        } else if let Some(percent) = s.strip_suffix('%') {
            SizingPolicy::Percentage {
                percent: percent.trim().parse().map_err(|_| invalid())?,
            }
        } else {
            let (dims, keep_aspect_ratio) = match s.strip_suffix('!') {
                Some(dims) => (dims, false),
                None => (s, true),
            };
            let (w, h) = dims
                .split_once(|c| c == 'x' || c == 'X')
                .ok_or_else(invalid)?;
            SizingPolicy::Custom {
                width: w.trim().parse().map_err(|_| invalid())?,
                height: h.trim().parse().map_err(|_| invalid())?,
                keep_aspect_ratio,
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Resize `original` per `policy`. `Original` returns an unchanged copy.
pub fn apply_sizing(original: &RasterImage, policy: &SizingPolicy) -> Result<RasterImage> {
    let target = policy.target_size(original.size())?;
    if target == original.size() {
        return Ok(original.clone());
    }

    debug!(from = %original.size(), to = %target, ?policy, "Resizing export canvas");
    Ok(original.resized(target)?)
}
