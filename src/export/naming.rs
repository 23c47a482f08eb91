//! Output file naming.
//!
//! The rule is applied to the source's base name; the extension always
//! comes from the output format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::EncodeError;
use super::format::OutputFormat;

pub const DEFAULT_PREFIX: &str = "wm_";
pub const DEFAULT_SUFFIX: &str = "_watermarked";

/// How an exported file is named after its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "text", rename_all = "snake_case")]
pub enum NamingRule {
    Original,
    Prefix(String),
    Suffix(String),
}

impl Default for NamingRule {
    fn default() -> Self {
        NamingRule::Suffix(DEFAULT_SUFFIX.to_string())
    }
}

impl NamingRule {
    /// Prefix and suffix text must not be blank.
    pub fn validate(&self) -> Result<(), EncodeError> {
        match self {
            NamingRule::Original => Ok(()),
            NamingRule::Prefix(text) if text.trim().is_empty() => {
                Err(EncodeError::invalid("prefix text must not be empty"))
            }
            NamingRule::Suffix(text) if text.trim().is_empty() => {
                Err(EncodeError::invalid("suffix text must not be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Output file name for `source` in `format`.
    pub fn file_name(&self, source: &Path, format: OutputFormat) -> Result<String, EncodeError> {
        self.validate()?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                EncodeError::invalid(format!("no file name in {}", source.display()))
            })?;

        let base = match self {
            NamingRule::Original => stem.to_string(),
            NamingRule::Prefix(text) => format!("{}{}", text.trim(), stem),
            NamingRule::Suffix(text) => format!("{}{}", stem, text.trim()),
        };
        Ok(format!("{}.{}", base, format.extension()))
    }

    /// Full output path for `source` inside `output_dir`.
    pub fn output_path(
        &self,
        source: &Path,
        output_dir: &Path,
        format: OutputFormat,
    ) -> Result<PathBuf, EncodeError> {
        Ok(output_dir.join(self.file_name(source, format)?))
    }
}

impl fmt::Display for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingRule::Original => f.write_str("original"),
            NamingRule::Prefix(text) => write!(f, "prefix:{}", text),
            NamingRule::Suffix(text) => write!(f, "suffix:{}", text),
        }
    }
}

/// `original`, `prefix`, `prefix:<text>`, `suffix` or `suffix:<text>`.
impl FromStr for NamingRule {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, text) = match s.split_once(':') {
            Some((kind, text)) => (kind, Some(text)),
            None => (s, None),
        };

        let rule = match (kind.trim().to_lowercase().as_str(), text) {
            ("original", None) => NamingRule::Original,
            ("prefix", None) => NamingRule::Prefix(DEFAULT_PREFIX.to_string()),
            ("prefix", Some(text)) => NamingRule::Prefix(text.to_string()),
            ("suffix", None) => NamingRule::Suffix(DEFAULT_SUFFIX.to_string()),
            ("suffix", Some(text)) => NamingRule::Suffix(text.to_string()),
            _ => {
                return Err(EncodeError::invalid(format!(
                    "unknown naming rule '{}'",
                    s
                )))
            }
        };
        rule.validate()?;
        Ok(rule)
    }
}

/// True when exporting into the folder `source` lives in, where an
/// `Original` rule would overwrite it.
pub fn targets_source_folder(source: &Path, output_dir: &Path) -> bool {
    let Some(parent) = source.parent() else {
        return false;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    match (parent.canonicalize(), output_dir.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => parent == output_dir,
    }
}
