//! Test record store: a JSON array rewritten in full on every mutation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::data_dir;

/// Lifecycle status of a test record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Never executed
    NotRun,
    /// Currently executing
    Running,
    /// Last run completed without issues
    Passed,
    /// Last run reported issues or errored
    Failed,
}

/// A stored UI test: free-text instructions plus run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Human-readable test name
    pub name: String,
    /// Natural-language instructions, one action per line
    pub instructions: String,
    /// Optional login credentials (username/password)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<HashMap<String, String>>,
    pub status: TestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
}

/// Partial update for [`TestStore::update`]; unset fields are left untouched
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TestRecordPatch {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub credentials: Option<HashMap<String, String>>,
    pub status: Option<TestStatus>,
    pub last_run: Option<DateTime<Utc>>,
}

/// Whole-file read-modify-write store for test records.
///
/// No locking: concurrent invocations from two processes can race and lose
/// updates. Single sequential CLI runs are the supported usage.
pub struct TestStore {
    storage_path: PathBuf,
}

impl TestStore {
    pub fn new() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("test_flows.json")))
    }

    /// Use an explicit file path (tests point this at a temp directory)
    pub fn at(storage_path: PathBuf) -> Self {
        TestStore { storage_path }
    }

    /// All records in creation order; a missing file reads as empty
    pub fn list(&self) -> Result<Vec<TestRecord>> {
        if !self.storage_path.exists() {
            self.save(&[])?;
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&self.storage_path)
            .with_context(|| format!("Failed to read {}", self.storage_path.display()))?;
        let records: Vec<TestRecord> = serde_json::from_str(&json)
            .with_context(|| format!("Malformed test store {}", self.storage_path.display()))?;
        Ok(records)
    }

    pub fn get(&self, test_id: &str) -> Result<Option<TestRecord>> {
        Ok(self.list()?.into_iter().find(|t| t.id == test_id))
    }

    /// Append a new record with a fresh id and `not_run` status
    pub fn create(
        &self,
        name: &str,
        instructions: &str,
        credentials: Option<HashMap<String, String>>,
    ) -> Result<TestRecord> {
        let record = TestRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            instructions: instructions.to_string(),
            credentials,
            status: TestStatus::NotRun,
            created_at: Utc::now(),
            updated_at: None,
            last_run: None,
        };

        let mut records = self.list()?;
        records.push(record.clone());
        self.save(&records)?;

        info!("Created test '{}' ({})", record.name, record.id);
        Ok(record)
    }

    /// Merge a partial patch into an existing record, stamping `updated_at`.
    /// Returns None if the id is unknown.
    pub fn update(&self, test_id: &str, patch: TestRecordPatch) -> Result<Option<TestRecord>> {
        let mut records = self.list()?;
        let Some(record) = records.iter_mut().find(|t| t.id == test_id) else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(instructions) = patch.instructions {
            record.instructions = instructions;
        }
        if let Some(credentials) = patch.credentials {
            record.credentials = Some(credentials);
        }
        if let Some(status) = patch.status {
            record.status = status;
        }
        if let Some(last_run) = patch.last_run {
            record.last_run = Some(last_run);
        }
        record.updated_at = Some(Utc::now());

        let updated = record.clone();
        self.save(&records)?;

        debug!("Updated test {}", test_id);
        Ok(Some(updated))
    }

    /// Set `status` and stamp `last_run` with the current time
    pub fn update_status(&self, test_id: &str, status: TestStatus) -> Result<Option<TestRecord>> {
        self.update(
            test_id,
            TestRecordPatch {
                status: Some(status),
                last_run: Some(Utc::now()),
                ..Default::default()
            },
        )
    }

    fn save(&self, records: &[TestRecord]) -> Result<()> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.storage_path, json)
            .with_context(|| format!("Failed to write {}", self.storage_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
