//! Main entry point for the wayplan CLI.
//!
//! This is the command-line interface for the wayplan travel plan store.
//! It provides commands for managing plans and their locations:
//! - `init`: Create the data directory and database
//! - `plan`: List, show, create, update and delete plans
//! - `location`: Add, update and remove locations of a plan
//! - `apply-sql`: Run a script on every shard database
//! - `bench`: Measure concurrent insert and read throughput

mod cli;
mod commands;
mod error;
mod utils;

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use error::CliError;
use utils::GlobalOptions;

fn main() {
    // Usage errors share exit code 4 with other invalid arguments
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => CliError::InvalidArguments(format!("{:?}", e.kind())).exit_code(),
            };
            std::process::exit(code);
        }
    };

    // Initialize logging based on verbosity
    wayplan::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        busy_timeout: cli.busy_timeout,
    };

    let result = match cli.command {
        cli::Command::Init(cmd) => cmd.execute(&global),
        cli::Command::Plan(cmd) => cmd.execute(&global),
        cli::Command::Location(cmd) => cmd.execute(&global),
        cli::Command::ApplySql(cmd) => cmd.execute(&global),
        cli::Command::Bench(cmd) => cmd.execute(&global),
        cli::Command::Completions(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
