//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    ApplySqlCommand, BenchCommand, CompletionsCommand, InitCommand, LocationCommand, PlanCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for managing travel plans.
#[derive(Parser)]
#[command(name = "wayplan")]
#[command(version, about = "Manage travel plans and their locations", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "WAYPLAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the busy timeout (in milliseconds)
    #[arg(
        long,
        value_name = "MILLISECONDS",
        global = true,
        env = "WAYPLAN_BUSY_TIMEOUT"
    )]
    pub busy_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Manage travel plans
    Plan(PlanCommand),

    /// Manage the locations of a plan
    Location(LocationCommand),

    /// Run a SQL script on every shard database, all or nothing
    ApplySql(ApplySqlCommand),

    /// Measure concurrent insert and read throughput
    Bench(BenchCommand),

    /// Generate shell completion scripts
    Completions(CompletionsCommand),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
