use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file; relative paths resolve under the data directory.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Pruning starts once the exchange count exceeds this.
    #[serde(default = "default_max_records")]
    pub max_records: u32,
    /// Number of oldest exchanges removed per pruning pass.
    #[serde(default = "default_prune_batch")]
    pub prune_batch: u32,
    /// Seconds between background pruning passes while serving; 0 disables.
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

fn default_storage_path() -> String {
    "nekorelay.db".into()
}

fn default_max_records() -> u32 {
    200
}

fn default_prune_batch() -> u32 {
    100
}

fn default_prune_interval_secs() -> u64 {
    60
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_records: default_max_records(),
            prune_batch: default_prune_batch(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.trim().is_empty() {
            return Err(ConfigError::Validation("storage.path must not be empty".into()));
        }
        if self.prune_batch == 0 {
            return Err(ConfigError::Validation(
                "storage.prune_batch must be > 0".into(),
            ));
        }
        Ok(())
    }
}
