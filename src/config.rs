//! Target-site configuration backed by a single JSON document

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Application configuration for the site under test
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the site under test; unset until configured
    pub target_url: Option<String>,
    /// Run newly created tests immediately after creation
    #[serde(default)]
    pub auto_run: bool,
}

/// Partial update applied over a loaded [`Config`]
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConfigPatch {
    pub target_url: Option<String>,
    pub auto_run: Option<bool>,
}

/// Default data directory for config, test records and run logs
pub fn data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().context("Unable to determine home directory")?;
    Ok(home_dir.join(".testflow"))
}

/// Loads and saves the whole config document
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Result<Self> {
        Ok(Self::at(data_dir()?.join("config.json")))
    }

    /// Use an explicit file path (tests point this at a temp directory)
    pub fn at(config_path: PathBuf) -> Self {
        ConfigStore { config_path }
    }

    /// Load the current config, materializing defaults on first use
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            let config = Config::default();
            self.save(&config)?;
            info!("Created default config at {}", self.config_path.display());
            return Ok(config);
        }

        let json = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))?;
        let config: Config = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config file {}", self.config_path.display()))?;
        Ok(config)
    }

    /// Overwrite the whole config document
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, json)
            .with_context(|| format!("Failed to write {}", self.config_path.display()))?;
        debug!("Saved config to {}", self.config_path.display());
        Ok(())
    }

    /// Merge a partial patch into the loaded config and save
    pub fn update(&self, patch: ConfigPatch) -> Result<Config> {
        let mut config = self.load()?;
        if let Some(url) = patch.target_url {
            config.target_url = Some(url);
        }
        if let Some(auto_run) = patch.auto_run {
            config.auto_run = auto_run;
        }
        self.save(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
