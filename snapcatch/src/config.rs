//! Deployment configuration
//!
//! One small TOML file per deployment. Every field has a default, so the
//! tool also runs with no config file at all.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::{info, warn};

use crate::constants::{defaults, poll};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root dataset collection scanned by the reconciliation pass
    pub root_dataset: String,

    /// Dataset path prefixes whose snapshots are never eligible for pruning.
    /// The platform's applications dataset is appended automatically.
    pub protected_datasets: Vec<String>,

    /// Spacing between job status polls, in seconds
    pub poll_interval_secs: u64,

    /// Poll budget per triggered task
    pub max_polls: u32,

    /// Host RPC client binary
    pub middleware_bin: String,

    /// Storage CLI binary
    pub zfs_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut config = Self {
            root_dataset: defaults::ROOT_DATASET.to_string(),
            protected_datasets: Vec::new(),
            poll_interval_secs: poll::JOB_POLL_INTERVAL.as_secs(),
            max_polls: poll::MAX_JOB_POLLS,
            middleware_bin: defaults::MIDDLEWARE_BIN.to_string(),
            zfs_bin: defaults::ZFS_BIN.to_string(),
        };
        config.protect_platform_datasets();
        config
    }
}

impl Config {
    /// Load the config file at `path`, falling back to defaults when the
    /// file is absent. A present-but-broken file is an error.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        match fs::read_to_string(path).await {
            Ok(content) => {
                let mut config: Config = toml::from_str(&content)
                    .map_err(|e| anyhow!("Failed to parse config {}: {}", path, e))?;
                config.protect_platform_datasets();
                info!(
                    "Configuration loaded from {}: root {}, {} protected prefixes",
                    path,
                    config.root_dataset,
                    config.protected_datasets.len()
                );
                Ok(config)
            }
            Err(e) => {
                warn!("No config at {} ({}), using defaults", path, e);
                Ok(Config::default())
            }
        }
    }

    /// A snapshot of a protected dataset (or any of its children) must never
    /// be destroyed, whatever the prefix matching says.
    pub fn is_protected(&self, dataset: &str) -> bool {
        self.protected_datasets.iter().any(|prefix| {
            dataset == prefix
                || dataset
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// The applications dataset keeps the host platform alive; destroying
    /// its snapshots is never acceptable.
    fn protect_platform_datasets(&mut self) {
        let apps = format!("{}/{}", self.root_dataset, defaults::APPS_DATASET);
        if !self.is_protected(&apps) {
            self.protected_datasets.push(apps);
        }
    }
}
