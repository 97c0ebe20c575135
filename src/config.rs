//! Startup configuration. Everything has a sensible default; two environment
//! variables allow relocating data and raising log verbosity.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".school-library-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Subdirectory for rotated log files.
const LOG_DIR_NAME: &str = "logs";
const DEFAULT_LOG_LEVEL: &str = "info";
/// How often the event loop re-runs the retention check.
const RETENTION_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub const DATA_DIR_ENV: &str = "SCHOOL_LIBRARY_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "SCHOOL_LIBRARY_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub retention_check_interval: Duration,
}

impl AppConfig {
    /// Resolve configuration from the environment, falling back to
    /// `~/.school-library-manager`.
    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => default_data_dir()?,
        };
        let log_level = env::var(LOG_LEVEL_ENV)
            .ok()
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        Ok(Self::with_data_dir(data_dir).with_log_level(log_level))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            retention_check_interval: RETENTION_CHECK_INTERVAL,
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
