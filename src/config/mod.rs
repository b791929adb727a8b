pub mod model;


use anyhow::Result;
use std::path::Path;
use tokio::fs;

// Re-export main types
pub use self::model::{Config, LoggingConfig, ProcessingConfig, ServerConfig, StorageConfig};

impl Config {
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.root_directory.trim().is_empty() {
            anyhow::bail!("storage.root_directory cannot be empty");
        }

        if self.processing.progress_interval_records == 0 {
            anyhow::bail!("progress_interval_records must be at least 1");
        }

        if self.server.max_upload_mb == 0 {
            anyhow::bail!("max_upload_mb must be at least 1");
        }

        if self.server.bind_address.parse::<std::net::SocketAddr>().is_err() {
            anyhow::bail!("bind_address must be a socket address, got '{}'", self.server.bind_address);
        }

        if !matches!(self.logging.verbosity.as_str(), "silent" | "normal" | "verbose") {
            anyhow::bail!("verbosity must be 'silent', 'normal', or 'verbose'");
        }

        Ok(())
    }
}
