//! Template store file locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_LAST_SETTINGS_FILE, DEFAULT_TEMPLATES_FILE};

fn default_templates_file() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATES_FILE)
}

fn default_last_settings_file() -> PathBuf {
    PathBuf::from(DEFAULT_LAST_SETTINGS_FILE)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    /// JSON file holding all saved templates
    #[serde(default = "default_templates_file")]
    pub templates_file: PathBuf,
    /// JSON file holding the last used settings
    #[serde(default = "default_last_settings_file")]
    pub last_settings_file: PathBuf,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            templates_file: default_templates_file(),
            last_settings_file: default_last_settings_file(),
        }
    }
}
