//! Font discovery configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::DEFAULT_FONT_FAMILY;
use crate::watermark::FontBook;

fn default_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontsConfig {
    /// Directories scanned for font files (default: platform font directories)
    #[serde(default)]
    pub dirs: Vec<PathBuf>,
    /// Family used when a requested one is missing (default: Arial)
    #[serde(default = "default_family")]
    pub default_family: String,
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            default_family: default_family(),
        }
    }
}

impl FontsConfig {
    /// Scan the configured directories, or the system ones when none are set.
    pub fn font_book(&self) -> FontBook {
        if self.dirs.is_empty() {
            FontBook::system(&self.default_family)
        } else {
            FontBook::discover(&self.dirs, &self.default_family)
        }
    }
}
