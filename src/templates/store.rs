//! JSON-file template store.
//!
//! All templates live in one JSON object keyed by name; every operation
//! reads the file, applies the change and writes it back. A second file
//! holds the last used settings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::TemplateError;
use super::record::{timestamp, TemplateInfo, TemplateRecord};
use crate::config::TemplatesConfig;

pub type Templates = BTreeMap<String, TemplateRecord>;

/// Layout of an exported template bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateBundle {
    #[serde(default)]
    pub export_time: Option<String>,
    #[serde(default)]
    pub template_count: usize,
    pub templates: Templates,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates_file: PathBuf,
    last_settings_file: PathBuf,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, TemplateError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(TemplateError::io(path, err)),
    };
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|err| TemplateError::parse(path, err))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TemplateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| TemplateError::io(parent, err))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|err| TemplateError::parse(path, err))?;
    fs::write(path, json).map_err(|err| TemplateError::io(path, err))
}

fn checked_name(name: &str) -> Result<&str, TemplateError> {
    let name = name.trim();
    if name.is_empty() {
        Err(TemplateError::EmptyName)
    } else {
        Ok(name)
    }
}

impl TemplateStore {
    pub fn new(templates_file: impl Into<PathBuf>, last_settings_file: impl Into<PathBuf>) -> Self {
        Self {
            templates_file: templates_file.into(),
            last_settings_file: last_settings_file.into(),
        }
    }

    pub fn from_config(config: &TemplatesConfig) -> Self {
        Self::new(&config.templates_file, &config.last_settings_file)
    }

    pub fn templates_file(&self) -> &Path {
        &self.templates_file
    }

    pub fn last_settings_file(&self) -> &Path {
        &self.last_settings_file
    }

    /// Every template. A missing file is an empty store.
    pub fn load_all(&self) -> Result<Templates, TemplateError> {
        Ok(read_json(&self.templates_file)?.unwrap_or_default())
    }

    fn write_all(&self, templates: &Templates) -> Result<(), TemplateError> {
        write_json(&self.templates_file, templates)
    }

    /// Save under `name`, replacing any template of that name.
    pub fn save(&self, name: &str, mut record: TemplateRecord) -> Result<(), TemplateError> {
        let name = checked_name(name)?;
        let mut templates = self.load_all()?;

        let now = timestamp();
        record.name = Some(name.to_string());
        record.created_time = Some(now.clone());
        record.updated_time = Some(now);
        templates.insert(name.to_string(), record);

        self.write_all(&templates)?;
        info!(name, file = %self.templates_file.display(), "Template saved");
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<Option<TemplateRecord>, TemplateError> {
        Ok(self.load_all()?.remove(name.trim()))
    }

    /// Remove a template. Returns whether it existed.
    pub fn delete(&self, name: &str) -> Result<bool, TemplateError> {
        let mut templates = self.load_all()?;
        if templates.remove(name.trim()).is_none() {
            return Ok(false);
        }
        self.write_all(&templates)?;
        info!(name, "Template deleted");
        Ok(true)
    }

    /// Rename a template. Returns whether `old_name` existed; an existing
    /// template under `new_name` is not replaced.
    pub fn rename(&self, old_name: &str, new_name: &str) -> Result<bool, TemplateError> {
        let old_name = old_name.trim();
        let new_name = checked_name(new_name)?;
        let mut templates = self.load_all()?;

        if old_name != new_name && templates.contains_key(new_name) {
            return Err(TemplateError::AlreadyExists(new_name.to_string()));
        }
        let Some(mut record) = templates.remove(old_name) else {
            return Ok(false);
        };

        record.name = Some(new_name.to_string());
        record.updated_time = Some(timestamp());
        templates.insert(new_name.to_string(), record);
        self.write_all(&templates)?;
        info!(from = old_name, to = new_name, "Template renamed");
        Ok(true)
    }

    pub fn exists(&self, name: &str) -> Result<bool, TemplateError> {
        Ok(self.load_all()?.contains_key(name.trim()))
    }

    pub fn count(&self) -> Result<usize, TemplateError> {
        Ok(self.load_all()?.len())
    }

    pub fn info(&self, name: &str) -> Result<Option<TemplateInfo>, TemplateError> {
        Ok(self.load(name)?.map(|record| record.info(name.trim())))
    }

    /// Write every template to `path` as a bundle. Returns the count.
    pub fn export(&self, path: &Path) -> Result<usize, TemplateError> {
        let templates = self.load_all()?;
        let bundle = TemplateBundle {
            export_time: Some(timestamp()),
            template_count: templates.len(),
            templates,
        };
        write_json(path, &bundle)?;
        info!(count = bundle.template_count, path = %path.display(), "Templates exported");
        Ok(bundle.template_count)
    }

    /// Merge a bundle from `path`. Existing names are kept unless
    /// `overwrite` is set. Returns how many templates were taken.
    pub fn import(&self, path: &Path, overwrite: bool) -> Result<usize, TemplateError> {
        let bundle: TemplateBundle = read_json(path)?.ok_or_else(|| {
            TemplateError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            )
        })?;

        let mut templates = self.load_all()?;
        let now = timestamp();
        let mut imported = 0;
        for (name, mut record) in bundle.templates {
            if templates.contains_key(&name) && !overwrite {
                debug!(name = %name, "Skipping existing template");
                continue;
            }
            record.imported_time = Some(now.clone());
            templates.insert(name, record);
            imported += 1;
        }

        self.write_all(&templates)?;
        info!(imported, overwrite, path = %path.display(), "Templates imported");
        Ok(imported)
    }

    pub fn save_last_settings(&self, mut settings: TemplateRecord) -> Result<(), TemplateError> {
        settings.saved_time = Some(timestamp());
        write_json(&self.last_settings_file, &settings)?;
        debug!(file = %self.last_settings_file.display(), "Last settings saved");
        Ok(())
    }

    /// Settings from the previous run, if any were saved.
    pub fn load_last_settings(&self) -> Result<Option<TemplateRecord>, TemplateError> {
        read_json(&self.last_settings_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> TemplateStore {
        TemplateStore::new(dir.join("templates.json"), dir.join("last.json"))
    }

    fn record(text: &str) -> TemplateRecord {
        TemplateRecord {
            watermark_text: text.to_string(),
            ..TemplateRecord::default()
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(store.load_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.load("x").unwrap().is_none());
        assert!(store.load_last_settings().unwrap().is_none());
    }

    #[test]
    fn test_save_stamps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save(" night ", record("moon")).unwrap();

        let saved = store.load("night").unwrap().unwrap();
        assert_eq!(saved.name.as_deref(), Some("night"));
        assert_eq!(saved.watermark_text, "moon");
        let created = saved.created_time.unwrap();
        assert_eq!(created.len(), "2025-01-01 00:00:00".len());
        assert!(store.exists("night").unwrap());
        assert!(matches!(
            store.save("  ", record("x")),
            Err(TemplateError::EmptyName)
        ));
    }

    #[test]
    fn test_delete_and_rename() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save("a", record("1")).unwrap();
        store.save("b", record("2")).unwrap();

        assert!(matches!(
            store.rename("a", "b"),
            Err(TemplateError::AlreadyExists(_))
        ));
        assert!(store.rename("a", "c").unwrap());
        assert!(!store.rename("missing", "d").unwrap());
        let renamed = store.load("c").unwrap().unwrap();
        assert_eq!(renamed.name.as_deref(), Some("c"));
        assert_eq!(renamed.watermark_text, "1");
        assert!(!store.exists("a").unwrap());

        assert!(store.delete("b").unwrap());
        assert!(!store.delete("b").unwrap());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let source = store(&dir.path().join("one"));
        source.save("a", record("from-one")).unwrap();
        source.save("b", record("b")).unwrap();
        let bundle_path = dir.path().join("bundle.json");
        assert_eq!(source.export(&bundle_path).unwrap(), 2);

        let bundle: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&bundle_path).unwrap()).unwrap();
        assert_eq!(bundle["template_count"], 2);
        assert!(bundle["export_time"].is_string());

        let target = store(&dir.path().join("two"));
        target.save("a", record("from-two")).unwrap();

        assert_eq!(target.import(&bundle_path, false).unwrap(), 1);
        assert_eq!(target.load("a").unwrap().unwrap().watermark_text, "from-two");
        assert!(target.load("b").unwrap().unwrap().imported_time.is_some());

        assert_eq!(target.import(&bundle_path, true).unwrap(), 2);
        assert_eq!(target.load("a").unwrap().unwrap().watermark_text, "from-one");
    }

    #[test]
    fn test_import_rejects_bad_bundles() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        assert!(matches!(
            store.import(&dir.path().join("nope.json"), false),
            Err(TemplateError::Io { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, r#"{"a": {}}"#).unwrap();
        assert!(matches!(
            store.import(&bad, false),
            Err(TemplateError::Parse { .. })
        ));
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fs::write(store.templates_file(), "{not json").unwrap();
        assert!(matches!(store.load_all(), Err(TemplateError::Parse { .. })));
    }

    #[test]
    fn test_last_settings_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save_last_settings(record("last")).unwrap();
        let settings = store.load_last_settings().unwrap().unwrap();
        assert_eq!(settings.watermark_text, "last");
        assert!(settings.saved_time.is_some());
    }

    #[test]
    fn test_info() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save("x", TemplateRecord::default_template()).unwrap();
        let info = store.info("x").unwrap().unwrap();
        assert_eq!(info.name, "x");
        assert_eq!(info.font_size, 24.0);
        assert!(store.info("y").unwrap().is_none());
    }
}
