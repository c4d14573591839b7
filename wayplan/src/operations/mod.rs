//! Multi-step operations built on the repositories.
//!
//! - [`init`]: create the data directory, database and default config.
//! - [`bench`]: measure concurrent insert and read throughput.

pub mod bench;
pub mod init;

pub use bench::{BenchOptions, BenchReport, BenchTarget, PhaseReport};
pub use init::{init_database, InitOptions, InitResult};
