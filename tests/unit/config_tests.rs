// Configuration file to runtime objects

use std::io::Write;
use tempfile::NamedTempFile;

use filigree::config::{Config, ConfigError};
use filigree::export::{NamingRule, OutputFormat, SizingPolicy};
use filigree::geometry::Size;
use filigree::templates::TemplateStore;
use filigree::watermark::{Color, ReferenceSpace};

#[test]
fn test_config_file_builds_export_options_and_store() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("FILIGREE_IT_DATA_DIR", dir.path());

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br##"
preview:
  max_width: 500
  max_height: 500
export:
  format: jpg
  quality: 70
  naming:
    rule: suffix
    text: "-signed"
  sizing:
    mode: percentage
    percent: 25
  background: "#202020"
templates:
  templates_file: "${FILIGREE_IT_DATA_DIR}/templates.json"
  last_settings_file: "${FILIGREE_IT_DATA_DIR}/last.json"
"##,
    )
    .unwrap();
    file.flush().unwrap();

    let config = Config::from_file(file.path()).unwrap();
    config.validate().unwrap();

    let options = config
        .export
        .to_options(ReferenceSpace::Preview {
            bounds: config.preview.bounds(),
        })
        .unwrap();
    assert_eq!(options.format, OutputFormat::Jpeg);
    assert_eq!(options.quality, 70);
    assert_eq!(options.naming, NamingRule::Suffix("-signed".into()));
    assert_eq!(options.sizing, SizingPolicy::Percentage { percent: 25 });
    assert_eq!(options.background, Color::rgb(0x20, 0x20, 0x20));
    assert_eq!(
        options.reference,
        ReferenceSpace::Preview {
            bounds: Size::new(500, 500)
        }
    );

    let store = TemplateStore::from_config(&config.templates);
    assert_eq!(store.templates_file(), dir.path().join("templates.json"));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_unset_variable_fails_load() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"templates:\n  templates_file: \"${FILIGREE_IT_NEVER_SET}/t.json\"\n")
        .unwrap();
    file.flush().unwrap();
    assert!(matches!(
        Config::from_file(file.path()),
        Err(ConfigError::MissingEnvVar(_))
    ));
}
