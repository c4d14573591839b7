//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including data directory resolution, configuration loading, database
//! management and output formatting.

use crate::error::CliError;
use clap::ValueEnum;
use std::path::PathBuf;
use wayplan::config::DatabaseSettings;
use wayplan::database::resolve_data_dir;
use wayplan::{Config, ConfigBuilder, Database, DatabaseConfig, LogLevel};

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the busy timeout (in milliseconds).
    pub busy_timeout: Option<u64>,
}

/// Output format for commands that print records.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated table format (human-readable)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Resolve the data directory.
///
/// Priority: `--data-dir` (or `WAYPLAN_DATA_DIR` through clap), then the
/// library default `~/.wayplan`.
pub fn data_dir(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    match global.data_dir {
        Some(ref dir) => Ok(dir.clone()),
        None => resolve_data_dir().map_err(|e| CliError::Config(e.to_string())),
    }
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Global options (highest priority)
/// 2. Environment variables
/// 3. `<data dir>/config.yaml`
/// 4. Built-in defaults (lowest priority)
///
/// The configured `log_mode` takes effect here, below the `--verbose` and
/// `--quiet` flags.
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new().with_data_dir(data_dir(global)?);

    if let Some(ms) = global.busy_timeout {
        builder = builder.with_config(Config {
            database: Some(DatabaseSettings {
                path: None,
                busy_timeout_ms: Some(ms),
            }),
            ..Default::default()
        });
    }

    let config = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let configured = config.log_level().unwrap_or(LogLevel::Normal);
    wayplan::set_log_level(wayplan::resolve_level(
        global.verbose,
        global.quiet,
        configured,
    ));
    Ok(config)
}

/// Resolve the database path from the data directory and configuration.
pub fn database_path(global: &GlobalOptions, config: &Config) -> Result<PathBuf, CliError> {
    Ok(config.database_path(&data_dir(global)?))
}

/// Open the database, creating it on first use.
pub fn open_database(global: &GlobalOptions, config: &Config) -> Result<Database, CliError> {
    let db_config =
        DatabaseConfig::new(database_path(global, config)?).with_busy_timeout(config.busy_timeout());
    Database::open(db_config).map_err(CliError::from)
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
