//! Configuration validation.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use crate::logging::LogLevel;

/// Validates a merged configuration.
///
/// # Examples
///
/// ```
/// use wayplan::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
///
/// let bad = Config { log_mode: Some("loud".into()), ..Default::default() };
/// assert!(ConfigValidator::validate(&bad).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending key.
    pub fn validate(config: &Config) -> Result<()> {
        if let Some(db) = &config.database {
            if db.busy_timeout_ms == Some(0) {
                return Err(Error::Validation {
                    field: "database.busy_timeout_ms".into(),
                    message: "timeout must be greater than 0".into(),
                });
            }
            if db
                .path
                .as_ref()
                .is_some_and(|path| path.as_os_str().is_empty())
            {
                return Err(Error::Validation {
                    field: "database.path".into(),
                    message: "path must not be empty".into(),
                });
            }
        }

        if let Some(pagination) = &config.pagination {
            if pagination.default_page_size == Some(0) {
                return Err(Error::Validation {
                    field: "pagination.default_page_size".into(),
                    message: "page size must be at least 1".into(),
                });
            }
        }

        if let Some(mode) = &config.log_mode {
            LogLevel::parse(mode).map_err(|message| Error::Validation {
                field: "log_mode".into(),
                message,
            })?;
        }

        Ok(())
    }
}
