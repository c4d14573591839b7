//! Environment variable handling for configuration overrides.
//!
//! `WAYPLAN_*` variables override values read from `config.yaml`.

use std::env;
use std::path::PathBuf;

use crate::config::schema::{Config, DatabaseSettings, PaginationConfig};
use crate::error::{Error, Result};
use crate::logging::LOG_MODE_ENV;

/// Busy timeout in milliseconds.
pub const BUSY_TIMEOUT_ENV: &str = "WAYPLAN_BUSY_TIMEOUT";
/// Database file path.
pub const DATABASE_PATH_ENV: &str = "WAYPLAN_DATABASE_PATH";
/// Default page size for listings.
pub const PAGE_SIZE_ENV: &str = "WAYPLAN_PAGE_SIZE";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use wayplan::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds a value that does not parse.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(value) = env::var(BUSY_TIMEOUT_ENV) {
            let ms = Self::parse_number(BUSY_TIMEOUT_ENV, &value)?;
            config
                .database
                .get_or_insert_with(DatabaseSettings::default)
                .busy_timeout_ms = Some(ms);
        }

        if let Ok(value) = env::var(DATABASE_PATH_ENV) {
            if !value.is_empty() {
                config
                    .database
                    .get_or_insert_with(DatabaseSettings::default)
                    .path = Some(PathBuf::from(value));
            }
        }

        if let Ok(value) = env::var(PAGE_SIZE_ENV) {
            let size = Self::parse_number(PAGE_SIZE_ENV, &value)?;
            let size = u32::try_from(size).map_err(|_| Error::Validation {
                field: PAGE_SIZE_ENV.into(),
                message: "value is too large".into(),
            })?;
            config
                .pagination
                .get_or_insert_with(PaginationConfig::default)
                .default_page_size = Some(size);
        }

        if let Ok(value) = env::var(LOG_MODE_ENV) {
            config.log_mode = Some(value);
        }

        Ok(())
    }

    fn parse_number(name: &str, value: &str) -> Result<u64> {
        value.trim().parse().map_err(|_| Error::Validation {
            field: name.into(),
            message: format!("expected a non-negative integer, got '{value}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;

    fn clear() {
        for name in [BUSY_TIMEOUT_ENV, DATABASE_PATH_ENV, PAGE_SIZE_ENV, LOG_MODE_ENV] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_no_variables_no_changes() {
        clear();
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_overrides_applied() {
        clear();
        env::set_var(BUSY_TIMEOUT_ENV, "1500");
        env::set_var(DATABASE_PATH_ENV, "/tmp/other.db");
        env::set_var(PAGE_SIZE_ENV, "3");
        env::set_var(LOG_MODE_ENV, "quiet");

        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        clear();

        assert_eq!(config.busy_timeout(), Duration::from_millis(1500));
        assert_eq!(config.default_page_size(), 3);
        assert_eq!(config.log_mode.as_deref(), Some("quiet"));
        assert_eq!(
            config.database.unwrap().path,
            Some(PathBuf::from("/tmp/other.db"))
        );
    }

    #[test]
    #[serial]
    fn test_invalid_number_rejected() {
        clear();
        env::set_var(BUSY_TIMEOUT_ENV, "soon");
        let mut config = Config::default();
        let err = EnvironmentConfig::apply_overrides(&mut config).unwrap_err();
        clear();
        assert!(matches!(err, Error::Validation { field, .. } if field == BUSY_TIMEOUT_ENV));
    }
}
