//! Configuration management for the task list application.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;

/// Default `tracing_subscriber::EnvFilter` directive
pub const DEFAULT_LOG_FILTER: &str = "tasklist=info,tasklist_runtime=info,tasklist_storage=info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the key-value store (`TASKLIST_DATA_DIR`)
    pub data_dir: PathBuf,
    /// Directory holding the log file (`TASKLIST_LOG_DIR`, defaults to the data dir)
    pub log_dir: PathBuf,
    /// Log file name (`TASKLIST_LOG_FILE`)
    pub log_file: String,
    /// Log filter directive (`RUST_LOG`)
    pub log_filter: String,
}

impl Config {
    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns a variable's value if set.
    ///
    /// Empty values count as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = var("TASKLIST_DATA_DIR")
            .map_or_else(default_data_dir, PathBuf::from);
        let log_dir = var("TASKLIST_LOG_DIR").map_or_else(|| data_dir.clone(), PathBuf::from);

        Self {
            log_dir,
            log_file: var("TASKLIST_LOG_FILE").unwrap_or_else(|| "tasklist.log".to_string()),
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            data_dir,
        }
    }
}

/// Platform data directory, or `./.tasklist` when the platform has none
fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".tasklist"), |dir| dir.join("tasklist"))
}
