// Unit tests for the config store

use super::*;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

#[test]
fn test_load_creates_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = ConfigStore::at(path.clone());

    let config = store.load().unwrap();
    assert_eq!(config.target_url, None);
    assert!(!config.auto_run);

    // The file now exists and holds the defaults
    assert!(path.exists());
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_update_merges_partial_patch() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::at(dir.path().join("config.json"));

    let config = store
        .update(ConfigPatch {
            target_url: Some("http://example.com".to_string()),
            auto_run: None,
        })
        .unwrap();
    assert_eq!(config.target_url.as_deref(), Some("http://example.com"));
    assert!(!config.auto_run);

    // A second patch touching only auto_run leaves target_url alone
    let config = store
        .update(ConfigPatch {
            target_url: None,
            auto_run: Some(true),
        })
        .unwrap();
    assert_eq!(config.target_url.as_deref(), Some("http://example.com"));
    assert!(config.auto_run);
}

#[test]
fn test_save_overwrites_whole_document() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::at(dir.path().join("config.json"));

    store
        .save(&Config {
            target_url: Some("http://a.com".to_string()),
            auto_run: true,
        })
        .unwrap();
    store.save(&Config::default()).unwrap();

    let config = store.load().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{\"target_url\": 42}").unwrap();

    let store = ConfigStore::at(path);
    assert!(store.load().is_err());
}
