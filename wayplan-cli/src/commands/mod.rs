//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `init`: Create the data directory, database and default config
//! - `plan`: Plan listing, detail and version-checked writes
//! - `location`: Location writes, including reordering
//! - `apply_sql`: All-or-nothing script across shard databases
//! - `bench`: Concurrent insert and read benchmark
//! - `completions`: Shell completion scripts

pub mod apply_sql;
pub mod bench;
pub mod completions;
pub mod init;
pub mod location;
pub mod plan;

pub use apply_sql::ApplySqlCommand;
pub use bench::BenchCommand;
pub use completions::CompletionsCommand;
pub use init::InitCommand;
pub use location::LocationCommand;
pub use plan::PlanCommand;
