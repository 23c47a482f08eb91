//! Font discovery and selection.
//!
//! Faces are found by scanning font directories for `.ttf`, `.otf` and
//! `.ttc` files. Family and style come from the file name
//! (`DejaVuSans-BoldOblique.ttf` is family `dejavusans`, bold, italic), so
//! no font file is parsed until it is first used. Parsed faces are cached
//! for the lifetime of the book.

use ab_glyph::FontVec;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::spec::FontDescriptor;
use super::WatermarkError;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

const STYLE_TOKENS: &[&str] = &[
    "regular",
    "bold",
    "italic",
    "oblique",
    "bolditalic",
    "boldoblique",
    "book",
    "roman",
    "normal",
];

/// A font file known to the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    pub path: PathBuf,
    pub family_key: String,
    pub bold: bool,
    pub italic: bool,
}

impl FontFace {
    /// Describe a font file from its name. Returns `None` for non-font files.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if !FONT_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        let lower = stem.to_lowercase();
        let family_key: String = lower
            .split(['-', '_', ' '])
            .filter(|token| !token.is_empty() && !STYLE_TOKENS.contains(token))
            .collect();
        if family_key.is_empty() {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            family_key,
            bold: lower.contains("bold"),
            italic: lower.contains("italic") || lower.contains("oblique"),
        })
    }

    fn style_score(&self, descriptor: &FontDescriptor) -> u8 {
        (self.bold == descriptor.bold) as u8 + (self.italic == descriptor.italic) as u8
    }
}

/// Normalize a family name the same way file stems are keyed.
pub fn family_key(family: &str) -> String {
    family
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect()
}

/// Platform font directories, in search order.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    if cfg!(target_os = "windows") {
        let root = std::env::var("WINDIR").unwrap_or_else(|_| "C:\\Windows".to_string());
        dirs.push(PathBuf::from(root).join("Fonts"));
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        dirs.push(PathBuf::from("/Library/Fonts"));
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    } else {
        dirs.push(PathBuf::from("/usr/share/fonts"));
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        if let Ok(home) = std::env::var("HOME") {
            let home = PathBuf::from(home);
            dirs.push(home.join(".fonts"));
            dirs.push(home.join(".local/share/fonts"));
        }
    }

    dirs
}

/// Set of available font faces with a parse cache.
pub struct FontBook {
    faces: Vec<FontFace>,
    default_family: String,
    loaded: RwLock<HashMap<PathBuf, Arc<FontVec>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.len())
            .field("default_family", &self.default_family)
            .field("loaded", &self.loaded.read().len())
            .finish()
    }
}

impl FontBook {
    /// Book over an explicit list of faces.
    pub fn from_faces(mut faces: Vec<FontFace>, default_family: &str) -> Self {
        faces.sort_by(|a, b| a.path.cmp(&b.path));
        faces.dedup_by(|a, b| a.path == b.path);
        Self {
            faces,
            default_family: family_key(default_family),
            loaded: RwLock::new(HashMap::new()),
        }
    }

    /// Scan `dirs` recursively. Missing directories are skipped.
    pub fn discover<P: AsRef<Path>>(dirs: &[P], default_family: &str) -> Self {
        let mut faces = Vec::new();
        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "Font directory not present");
                continue;
            }
            faces.extend(
                WalkDir::new(dir)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .filter(|entry| entry.file_type().is_file())
                    .filter_map(|entry| FontFace::from_path(entry.path())),
            );
        }

        let book = Self::from_faces(faces, default_family);
        debug!(
            faces = book.faces.len(),
            default_family = %book.default_family,
            "Font discovery complete"
        );
        book
    }

    /// Book over the platform font directories.
    pub fn system(default_family: &str) -> Self {
        Self::discover(&default_font_dirs(), default_family)
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Distinct family keys, sorted.
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self.faces.iter().map(|f| f.family_key.clone()).collect();
        families.sort();
        families.dedup();
        families
    }

    /// Pick the face for a descriptor: requested family, then the default
    /// family, then anything. Within a family the closest style wins.
    pub fn select(&self, descriptor: &FontDescriptor) -> Option<&FontFace> {
        let best_in = |key: &str| {
            self.faces
                .iter()
                .filter(|face| face.family_key == key)
                .fold(None::<&FontFace>, |best, face| match best {
                    Some(b) if b.style_score(descriptor) >= face.style_score(descriptor) => Some(b),
                    _ => Some(face),
                })
        };

        best_in(&family_key(&descriptor.family))
            .or_else(|| best_in(&self.default_family))
            .or_else(|| {
                self.faces.iter().fold(None::<&FontFace>, |best, face| match best {
                    Some(b) if b.style_score(descriptor) >= face.style_score(descriptor) => Some(b),
                    _ => Some(face),
                })
            })
    }

    /// Load (or fetch from cache) the face for a descriptor.
    pub fn resolve(&self, descriptor: &FontDescriptor) -> Result<Arc<FontVec>, WatermarkError> {
        let face = self.select(descriptor).ok_or_else(|| {
            WatermarkError::FontUnavailable(format!(
                "no font faces available for family '{}'",
                descriptor.family
            ))
        })?;

        if let Some(font) = self.loaded.read().get(&face.path) {
            return Ok(Arc::clone(font));
        }

        let font = Arc::new(load_face(&face.path)?);
        if face.family_key != family_key(&descriptor.family) {
            warn!(
                requested = %descriptor.family,
                using = %face.path.display(),
                "Requested font family not found, falling back"
            );
        }
        self.loaded
            .write()
            .insert(face.path.clone(), Arc::clone(&font));
        Ok(font)
    }
}

fn load_face(path: &Path) -> Result<FontVec, WatermarkError> {
    let data = std::fs::read(path).map_err(|e| {
        WatermarkError::FontUnavailable(format!("cannot read {}: {}", path.display(), e))
    })?;
    FontVec::try_from_vec_and_index(data, 0).map_err(|_| {
        WatermarkError::FontUnavailable(format!("cannot parse {}", path.display()))
    })
}
