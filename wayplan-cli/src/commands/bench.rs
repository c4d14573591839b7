//! Bench command implementation.

use crate::error::CliError;
use crate::utils::{database_path, load_configuration, print_json, GlobalOptions, OutputFormat};
use clap::Args;
use std::path::PathBuf;
use wayplan::operations::bench::{run, BenchOptions, BenchTarget, PhaseReport};
use wayplan::ShardMap;

/// Measure concurrent insert and read throughput.
#[derive(Args)]
pub struct BenchCommand {
    /// Shard mapping; without it the configured database is used
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Plans to insert
    #[arg(long, default_value_t = 1000)]
    pub count: usize,

    /// Random point reads after inserting
    #[arg(long, default_value_t = 1000)]
    pub reads: usize,

    /// Worker threads
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// Output format
    #[arg(long, value_enum, default_value = "table", ignore_case = true)]
    pub format: OutputFormat,
}

impl BenchCommand {
    /// Execute the bench command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;

        let target = match self.mapping {
            Some(ref mapping) => BenchTarget::Sharded(ShardMap::load(mapping)?),
            None => BenchTarget::Single(database_path(global, &config)?),
        };
        let options = BenchOptions::new(target)
            .with_count(self.count)
            .with_reads(self.reads)
            .with_concurrency(self.concurrency)
            .with_busy_timeout(config.busy_timeout());

        let report = run(&options)?;

        match self.format {
            OutputFormat::Json => print_json(&report)?,
            OutputFormat::Table => {
                println!("workers: {}", report.concurrency);
                print_phase("insert", &report.inserts);
                print_phase("read", &report.reads);
            }
        }
        Ok(())
    }
}

fn print_phase(name: &str, phase: &PhaseReport) {
    println!(
        "{name}: {}/{} ok in {:.3}s ({:.0} ops/s)",
        phase.succeeded,
        phase.attempted,
        phase.elapsed.as_secs_f64(),
        phase.ops_per_sec()
    );
}
