//! Layered configuration assembly.

use std::path::{Path, PathBuf};

use crate::config::environment::EnvironmentConfig;
use crate::config::loader::ConfigLoader;
use crate::config::merger::ConfigMerger;
use crate::config::schema::Config;
use crate::config::validator::ConfigValidator;
use crate::database::resolve_data_dir;
use crate::error::Result;

/// Builds a [`Config`] from defaults, `config.yaml`, the environment and
/// programmatic overrides, in that order of increasing precedence.
///
/// # Examples
///
/// ```
/// use wayplan::config::{Config, ConfigBuilder};
///
/// let config = ConfigBuilder::new()
///     .skip_files()
///     .skip_env()
///     .with_config(Config { log_mode: Some("quiet".into()), ..Default::default() })
///     .build()
///     .unwrap();
/// assert_eq!(config.log_mode.as_deref(), Some("quiet"));
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    skip_files: bool,
    skip_env: bool,
    overrides: Vec<Config>,
}

impl ConfigBuilder {
    /// Creates a builder that reads every source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `config.yaml` from `dir` instead of the resolved data dir.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Ignores `config.yaml`.
    #[must_use]
    pub const fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Ignores `WAYPLAN_*` variables.
    #[must_use]
    pub const fn skip_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Adds a programmatic layer; later layers win.
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.overrides.push(config);
        self
    }

    /// Merges every layer and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or parsed, an environment
    /// variable is malformed, or the merged result fails validation.
    pub fn build(self) -> Result<Config> {
        let mut config = Config::default();

        if !self.skip_files {
            let data_dir = match self.data_dir {
                Some(dir) => dir,
                None => resolve_data_dir()?,
            };
            if let Some(source) = ConfigLoader::load_user_config(&data_dir)? {
                ConfigMerger::merge_into(&mut config, &source.config);
            }
        }

        if !self.skip_env {
            EnvironmentConfig::apply_overrides(&mut config)?;
        }

        for layer in &self.overrides {
            ConfigMerger::merge_into(&mut config, layer);
        }

        ConfigValidator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::environment::PAGE_SIZE_ENV;
    use crate::config::loader::CONFIG_FILE_NAME;
    use crate::config::schema::PaginationConfig;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    fn page_size(size: u32) -> Config {
        Config {
            pagination: Some(PaginationConfig {
                default_page_size: Some(size),
            }),
            ..Default::default()
        }
    }

    #[test]
    #[serial]
    fn test_precedence_file_env_override() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "pagination:\n  default_page_size: 11\nlog_mode: verbose\n",
        )
        .unwrap();

        std::env::remove_var(PAGE_SIZE_ENV);
        let from_file = ConfigBuilder::new()
            .with_data_dir(dir.path())
            .build()
            .unwrap();
        assert_eq!(from_file.default_page_size(), 11);

        std::env::set_var(PAGE_SIZE_ENV, "12");
        let from_env = ConfigBuilder::new()
            .with_data_dir(dir.path())
            .build()
            .unwrap();
        assert_eq!(from_env.default_page_size(), 12);
        assert_eq!(from_env.log_mode.as_deref(), Some("verbose"));

        let overridden = ConfigBuilder::new()
            .with_data_dir(dir.path())
            .with_config(page_size(13))
            .build()
            .unwrap();
        std::env::remove_var(PAGE_SIZE_ENV);
        assert_eq!(overridden.default_page_size(), 13);
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let result = ConfigBuilder::new()
            .skip_files()
            .skip_env()
            .with_config(page_size(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_skip_files_ignores_broken_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "nonsense: [").unwrap();
        ConfigBuilder::new()
            .with_data_dir(dir.path())
            .skip_files()
            .skip_env()
            .build()
            .unwrap();
    }
}
