//! Runtime configuration
//!
//! Defaults, overridden by a `.env` file and `PROMPTDOCK_*` environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{WaitTiming, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_TIMEOUT};
use crate::errors::{DockError, Result};

pub const ENV_DATA_DIR: &str = "PROMPTDOCK_DATA_DIR";
pub const ENV_SITES_FILE: &str = "PROMPTDOCK_SITES_FILE";
pub const ENV_WAIT_TIMEOUT_MS: &str = "PROMPTDOCK_WAIT_TIMEOUT_MS";
pub const ENV_POLL_MS: &str = "PROMPTDOCK_POLL_MS";
pub const ENV_LOG: &str = "PROMPTDOCK_LOG";

/// Application directory name under the platform data dir
const APP_DIR: &str = "promptdock";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub adapter: AdapterConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store file
    pub data_dir:   PathBuf,
    pub store_file: String,
}

impl StorageConfig {
    /// Full path of the JSON store file
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Site table replacing the bundled one
    pub sites_file:      Option<PathBuf>,
    pub wait_timeout_ms: u64,
    pub poll_ms:         u64,
}

impl AdapterConfig {
    pub fn timing(&self) -> WaitTiming {
        WaitTiming {
            timeout: Duration::from_millis(self.wait_timeout_ms),
            poll:    Duration::from_millis(self.poll_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. "info", "promptdock_core=debug")
    pub level:           String,
    pub with_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level:           "info".to_string(),
            with_timestamps: true,
        }
    }
}

/// Platform data directory for promptdock, `./promptdock` when unknown
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                data_dir:   default_data_dir(),
                store_file: "store.json".to_string(),
            },
            adapter: AdapterConfig {
                sites_file:      None,
                wait_timeout_ms: DEFAULT_WAIT_TIMEOUT.as_millis() as u64,
                poll_ms:         DEFAULT_POLL_INTERVAL.as_millis() as u64,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load `.env` (if any) and apply process environment overrides
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup(ENV_SITES_FILE).filter(|v| !v.trim().is_empty()) {
            config.adapter.sites_file = Some(PathBuf::from(file));
        }
        if let Some(raw) = lookup(ENV_WAIT_TIMEOUT_MS) {
            config.adapter.wait_timeout_ms = parse_millis(ENV_WAIT_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_POLL_MS) {
            config.adapter.poll_ms = parse_millis(ENV_POLL_MS, &raw)?;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            config.logging.level = level;
        }

        Ok(config)
    }
}

fn parse_millis(name: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(DockError::ConfigError(format!("{} must be greater than zero", name))),
        Ok(ms) => Ok(ms),
        Err(e) => Err(DockError::ConfigError(format!(
            "{} must be a whole number of milliseconds, got '{}': {}",
            name, raw, e
        ))),
    }
}
