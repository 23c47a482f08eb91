//! Preview area configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_FRAME_INTERVAL_MS, DEFAULT_PREVIEW_MAX_HEIGHT, DEFAULT_PREVIEW_MAX_WIDTH,
};
use crate::geometry::Size;

fn default_max_width() -> u32 {
    DEFAULT_PREVIEW_MAX_WIDTH
}

fn default_max_height() -> u32 {
    DEFAULT_PREVIEW_MAX_HEIGHT
}

fn default_frame_interval_ms() -> u64 {
    DEFAULT_FRAME_INTERVAL_MS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Preview area width in pixels (default: 800)
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    /// Preview area height in pixels (default: 600)
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    /// Minimum time between redraws in milliseconds (default: 16)
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl PreviewConfig {
    pub fn bounds(&self) -> Size {
        Size::new(self.max_width, self.max_height)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}
