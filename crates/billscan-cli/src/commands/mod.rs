//! Subcommand implementations.

pub mod batch;
pub mod config;
pub mod extract;
pub mod output;
pub mod process;
pub mod records;
pub mod suppliers;

use std::path::{Path, PathBuf};

use tracing::debug;

use billscan_core::SqliteStore;
use billscan_core::models::config::BillscanConfig;

/// Global options shared by every subcommand.
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
}

impl Context {
    /// Config file in use: the `--config` path or the per-user default.
    pub fn config_file(&self) -> PathBuf {
        self.config_path.clone().unwrap_or_else(default_config_path)
    }

    /// Load configuration, falling back to defaults when no file exists.
    pub fn load_config(&self) -> anyhow::Result<BillscanConfig> {
        if let Some(path) = &self.config_path {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(BillscanConfig::from_file(path)?);
        }

        let path = default_config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            Ok(BillscanConfig::from_file(&path)?)
        } else {
            Ok(BillscanConfig::default())
        }
    }

    /// Open the record store: `--store`, then the config, then the data dir.
    pub async fn open_store(&self, config: &BillscanConfig) -> anyhow::Result<SqliteStore> {
        let path = self
            .store_path
            .clone()
            .or_else(|| config.storage.path.clone())
            .unwrap_or_else(default_store_path);
        debug!("Using record store {}", path.display());
        Ok(SqliteStore::open(&path).await?)
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billscan")
        .join("config.json")
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billscan")
        .join("invoices.db")
}

/// File name component of a path, for display and record keeping.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}
