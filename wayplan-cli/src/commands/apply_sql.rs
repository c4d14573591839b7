//! Apply-sql command implementation.
//!
//! Runs one SQL script against every database named in a shard mapping.
//! Either every database commits the script or none does.

use crate::error::CliError;
use crate::utils::{load_configuration, GlobalOptions};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use wayplan::{apply_sql, ShardMap};

/// Run a SQL script on every shard database.
#[derive(Args)]
pub struct ApplySqlCommand {
    /// JSON file mapping shard keys 0-f to database files
    #[arg(long, value_name = "FILE")]
    pub mapping: PathBuf,

    /// SQL script to run
    #[arg(long, value_name = "SQL")]
    pub file: PathBuf,
}

impl ApplySqlCommand {
    /// Execute the apply-sql command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let map = ShardMap::load(&self.mapping)?;
        let sql = fs::read_to_string(&self.file)?;

        if sql.trim().is_empty() {
            return Err(CliError::InvalidArguments(format!(
                "{} contains no SQL",
                self.file.display()
            )));
        }

        let report = apply_sql(&map, &sql, config.busy_timeout())?;

        if !global.quiet {
            println!("Applied script to {} databases", report.databases.len());
            for path in &report.databases {
                println!("  - {}", path.display());
            }
        }
        Ok(())
    }
}
