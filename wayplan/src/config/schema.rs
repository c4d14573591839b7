//! Configuration schema definitions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::database::{DATABASE_FILE_NAME, DEFAULT_BUSY_TIMEOUT_MS};
use crate::logging::LogLevel;

/// Page size used when neither the caller nor the config names one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Complete configuration structure.
///
/// Every field is optional so that partial sources can be layered; the
/// accessor methods apply the built-in defaults.
///
/// # Examples
///
/// ```
/// use wayplan::config::{Config, PaginationConfig};
///
/// let config: Config = serde_yaml::from_str("pagination:\n  default_page_size: 50\n").unwrap();
/// assert_eq!(config.default_page_size(), 50);
/// assert_eq!(Config::default().default_page_size(), 20);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Storage settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseSettings>,

    /// Listing settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,

    /// Log verbosity: `quiet`, `normal` or `verbose`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_mode: Option<String>,
}

/// Storage settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DatabaseSettings {
    /// Database file; relative paths are resolved against the data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How long a writer waits for the write lock, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy_timeout_ms: Option<u64>,
}

/// Listing settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PaginationConfig {
    /// Page size for `plan list` when none is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_page_size: Option<u32>,
}

impl Config {
    /// The configuration written by `wayplan init --with-config`.
    #[must_use]
    pub fn documented_defaults() -> Self {
        Self {
            database: Some(DatabaseSettings {
                path: None,
                busy_timeout_ms: Some(DEFAULT_BUSY_TIMEOUT_MS),
            }),
            pagination: Some(PaginationConfig {
                default_page_size: Some(DEFAULT_PAGE_SIZE),
            }),
            log_mode: Some(LogLevel::Normal.to_string()),
        }
    }

    /// Effective busy timeout.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        let ms = self
            .database
            .as_ref()
            .and_then(|db| db.busy_timeout_ms)
            .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
        Duration::from_millis(ms)
    }

    /// Effective default page size.
    #[must_use]
    pub fn default_page_size(&self) -> u32 {
        self.pagination
            .as_ref()
            .and_then(|p| p.default_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Effective database path for a given data directory.
    #[must_use]
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        match self.database.as_ref().and_then(|db| db.path.as_ref()) {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => data_dir.join(path),
            None => data_dir.join(DATABASE_FILE_NAME),
        }
    }

    /// Configured log level, if any and valid.
    #[must_use]
    pub fn log_level(&self) -> Option<LogLevel> {
        self.log_mode
            .as_deref()
            .and_then(|mode| LogLevel::parse(mode).ok())
    }
}
