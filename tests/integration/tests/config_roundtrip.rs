//! Config save/load roundtrip integration tests.

use std::path::Path;

use tempfile::TempDir;
use vaultkeep_core::{Config, ConfigError};

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vaultkeep.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.generator.length, config.generator.length);
    assert_eq!(loaded.storage.timeout_ms, config.storage.timeout_ms);
    assert_eq!(loaded.vault.default_category, config.vault.default_category);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vaultkeep.json5");

    let mut config = Config::default();
    config.generator.length = 32;
    config.generator.use_symbols = false;
    config.vault.default_category = "Work".to_string();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.generator.length, 32);
    assert!(!loaded.generator.use_symbols);
    assert_eq!(loaded.vault.default_category, "Work");
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/vaultkeep.json5"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_parse_json5_comments() {
    let config = Config::parse(
        r#"{
            // generator defaults
            generator: { length: 24, },
        }"#,
    )
    .unwrap();
    assert_eq!(config.generator.length, 24);
    assert!(config.generator.use_upper);
}

#[test]
fn test_config_parse_invalid() {
    assert!(Config::parse("not valid json").is_err());
}
