//! Run-log artifacts: one timestamp-named JSON file per run

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::store::TestStatus;

/// What one run did and what it found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLog {
    pub instructions: String,
    pub target_url: String,
    /// Wall-clock execution time in seconds
    pub execution_time: f64,
    pub issues: Vec<String>,
    pub status: TestStatus,
    pub timestamp: chrono::DateTime<Utc>,
}

/// Write a run log under `logs_dir`, creating the directory as needed.
/// Returns the path of the written file.
pub fn write_run_log(logs_dir: &Path, log: &RunLog) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Failed to create logs directory {}", logs_dir.display()))?;

    let file_name = format!("test_run_{}.json", log.timestamp.format("%Y%m%d_%H%M%S%.3f"));
    let path = logs_dir.join(file_name);

    let json = serde_json::to_string_pretty(log)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote run log to {}", path.display());
    Ok(path)
}
