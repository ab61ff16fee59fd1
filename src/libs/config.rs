use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::libs::error::{Error, Result};

/// Where database files live and how connections to them behave.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding one SQLite file per database identifier.
    pub data_dir: PathBuf,
    /// Create `data_dir` when it is missing.
    pub create_data_dir: bool,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            create_data_dir: true,
            busy_timeout_ms: 5000,
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load from `ROWKIT_*` environment variables, defaulting what is unset.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            data_dir: env::var("ROWKIT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),

            create_data_dir: match env::var("ROWKIT_CREATE_DATA_DIR") {
                Ok(v) => v.parse().map_err(|_| Error::Config {
                    key: "ROWKIT_CREATE_DATA_DIR",
                    reason: format!("`{v}` is not a boolean"),
                })?,
                Err(_) => defaults.create_data_dir,
            },

            busy_timeout_ms: match env::var("ROWKIT_BUSY_TIMEOUT_MS") {
                Ok(v) => v.parse().map_err(|_| Error::Config {
                    key: "ROWKIT_BUSY_TIMEOUT_MS",
                    reason: format!("`{v}` is not a number of milliseconds"),
                })?,
                Err(_) => defaults.busy_timeout_ms,
            },
        })
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn database_path(&self, database: &str) -> PathBuf {
        self.data_dir.join(database)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
