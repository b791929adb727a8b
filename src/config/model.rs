use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::constants::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root_directory: String,
    /// Remove every other task's artifacts when a new file is submitted.
    pub purge_previous_artifacts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub progress_interval_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub max_upload_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbosity: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_directory: DEFAULT_STORAGE_ROOT.to_string(),
            purge_previous_artifacts: false,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            progress_interval_records: DEFAULT_PROGRESS_INTERVAL_RECORDS,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbosity: "normal".to_string(),
        }
    }
}

impl Config {
    pub fn storage_root(&self) -> PathBuf {
        PathBuf::from(&self.storage.root_directory)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.server.max_upload_mb * BYTES_PER_MB
    }
}
