//! Library exports for wayplan-cli.
//!
//! Exposes the CLI structure so the command tree can be inspected from
//! tests and completion tooling.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;
