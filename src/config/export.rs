//! Export defaults configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BACKGROUND, DEFAULT_JPEG_QUALITY};
use crate::export::{ExportOptions, NamingRule, OutputFormat, SizingPolicy};
use crate::watermark::{parse_hex_color, ReferenceSpace};

use super::ConfigError;

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (default: jpeg)
    #[serde(default)]
    pub format: OutputFormat,
    /// JPEG quality 1-100 (default: 95)
    #[serde(default = "default_quality")]
    pub quality: u8,
    /// Output file naming (default: suffix `_watermarked`)
    #[serde(default)]
    pub naming: NamingRule,
    /// Output canvas sizing (default: original)
    #[serde(default)]
    pub sizing: SizingPolicy,
    /// Fill behind transparent pixels for JPEG (default: #ffffff)
    #[serde(default = "default_background")]
    pub background: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: default_quality(),
            naming: NamingRule::default(),
            sizing: SizingPolicy::default(),
            background: default_background(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::invalid(format!(
                "export.quality must be 1-100, got {}",
                self.quality
            )));
        }
        self.naming
            .validate()
            .map_err(|e| ConfigError::invalid(format!("export.naming: {}", e)))?;
        self.sizing
            .validate()
            .map_err(|e| ConfigError::invalid(format!("export.sizing: {}", e)))?;
        parse_hex_color(&self.background)
            .map_err(|e| ConfigError::invalid(format!("export.background: {}", e)))?;
        Ok(())
    }

    /// Options for an export whose spec coordinates are in `reference` space.
    pub fn to_options(&self, reference: ReferenceSpace) -> Result<ExportOptions, ConfigError> {
        self.validate()?;
        let background = parse_hex_color(&self.background)
            .map_err(|e| ConfigError::invalid(format!("export.background: {}", e)))?;
        Ok(ExportOptions {
            format: self.format,
            quality: self.quality,
            background,
            sizing: self.sizing,
            naming: self.naming.clone(),
            reference,
        })
    }
}
