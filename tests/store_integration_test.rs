// Integration tests for the file-backed stores through the public API

use std::collections::HashMap;

use testflow::config::{Config, ConfigPatch, ConfigStore};
use testflow::store::{TestStatus, TestStore};
use tempfile::tempdir;

#[test]
fn config_defaults_materialize_on_first_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let store = ConfigStore::at(path.clone());

    assert!(!path.exists());
    let config = store.load().unwrap();
    assert_eq!(config, Config::default());
    assert!(path.exists());

    // The written file is the canonical two-field document
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw["target_url"].is_null());
    assert_eq!(raw["auto_run"], false);
}

#[test]
fn config_survives_process_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    ConfigStore::at(path.clone())
        .update(ConfigPatch {
            target_url: Some("http://staging.example.com".to_string()),
            auto_run: Some(true),
        })
        .unwrap();

    // A fresh store over the same file sees the same config
    let config = ConfigStore::at(path).load().unwrap();
    assert_eq!(config.target_url.as_deref(), Some("http://staging.example.com"));
    assert!(config.auto_run);
}

#[test]
fn record_store_file_is_a_json_array() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test_flows.json");
    let store = TestStore::at(path.clone());

    store.create("a", "go to /a", None).unwrap();
    store.create("b", "go to /b", None).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let records = raw.as_array().expect("store file holds a JSON array");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["status"], "not_run");
    assert!(records[0]["id"].is_string());
}

#[test]
fn record_lifecycle_round_trip() {
    let dir = tempdir().unwrap();
    let store = TestStore::at(dir.path().join("test_flows.json"));

    let mut credentials = HashMap::new();
    credentials.insert("username".to_string(), "qa".to_string());

    let created = store
        .create("checkout", "go to /cart\nclick checkout", Some(credentials.clone()))
        .unwrap();

    // Fresh store over the same file
    let store = TestStore::at(dir.path().join("test_flows.json"));
    let fetched = store.get(&created.id).unwrap().unwrap();
    assert_eq!(fetched.name, "checkout");
    assert_eq!(fetched.instructions, "go to /cart\nclick checkout");
    assert_eq!(fetched.credentials, Some(credentials));

    // Two status updates: last one wins, last_run moves forward
    let first = store
        .update_status(&created.id, TestStatus::Failed)
        .unwrap()
        .unwrap();
    let second = store
        .update_status(&created.id, TestStatus::Passed)
        .unwrap()
        .unwrap();
    assert_eq!(second.status, TestStatus::Passed);
    assert!(second.last_run.unwrap() >= first.last_run.unwrap());
}

#[test]
fn timestamps_serialize_as_iso8601_strings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test_flows.json");
    let store = TestStore::at(path.clone());
    let created = store.create("t", "wait 1ms", None).unwrap();
    store.update_status(&created.id, TestStatus::Passed).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let created_at = raw[0]["created_at"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
    let last_run = raw[0]["last_run"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(last_run).is_ok());
}
