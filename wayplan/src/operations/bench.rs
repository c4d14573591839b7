//! Concurrent insert and read benchmark.
//!
//! Worker threads each hold their own connections. The insert phase creates
//! `count` plans split across workers; the read phase then fetches `reads`
//! randomly chosen plans from the ones inserted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::database::{Database, DatabaseConfig, DEFAULT_BUSY_TIMEOUT_MS};
use crate::error::{Error, Result};
use crate::repository::TravelPlanRepository;
use crate::shard::ShardMap;
use crate::{PlanId, Title, TravelPlan};

/// Where benchmark plans are stored.
#[derive(Debug, Clone)]
pub enum BenchTarget {
    /// One database file.
    Single(PathBuf),
    /// Plans routed by shard key.
    Sharded(ShardMap),
}

impl BenchTarget {
    fn path_for(&self, plan_id: PlanId) -> Result<&Path> {
        match self {
            Self::Single(path) => Ok(path.as_path()),
            Self::Sharded(map) => map.path_for(plan_id),
        }
    }

    fn paths(&self) -> Vec<&Path> {
        match self {
            Self::Single(path) => vec![path.as_path()],
            Self::Sharded(map) => map.distinct_paths(),
        }
    }
}

/// Benchmark parameters.
#[derive(Debug, Clone)]
pub struct BenchOptions {
    /// Storage target.
    pub target: BenchTarget,
    /// Plans to insert.
    pub count: usize,
    /// Point reads to perform after inserting.
    pub reads: usize,
    /// Worker threads.
    pub concurrency: usize,
    /// Busy timeout for every worker connection.
    pub busy_timeout: Duration,
}

impl BenchOptions {
    /// Options with 1000 inserts, 1000 reads and 8 workers.
    #[must_use]
    pub fn new(target: BenchTarget) -> Self {
        Self {
            target,
            count: 1000,
            reads: 1000,
            concurrency: 8,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    /// Sets the number of plans to insert.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets the number of reads.
    #[must_use]
    pub fn with_reads(mut self, reads: usize) -> Self {
        self.reads = reads;
        self
    }

    /// Sets the number of worker threads.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

/// Totals for one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhaseReport {
    /// Operations attempted.
    pub attempted: usize,
    /// Operations that succeeded.
    pub succeeded: usize,
    /// Wall-clock time of the phase.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl PhaseReport {
    /// Successful operations per second.
    #[must_use]
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            // lossless below 2^52 operations
            #[allow(clippy::cast_precision_loss)]
            let ops = self.succeeded as f64;
            ops / secs
        } else {
            0.0
        }
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }
}

/// Benchmark outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    /// Worker threads used.
    pub concurrency: usize,
    /// Insert phase.
    pub inserts: PhaseReport,
    /// Read phase.
    pub reads: PhaseReport,
}

/// Per-worker connection cache.
struct Router<'a> {
    target: &'a BenchTarget,
    busy_timeout: Duration,
    open: HashMap<PathBuf, Database>,
}

impl<'a> Router<'a> {
    fn new(target: &'a BenchTarget, busy_timeout: Duration) -> Self {
        Self {
            target,
            busy_timeout,
            open: HashMap::new(),
        }
    }

    fn database_for(&mut self, plan_id: PlanId) -> Result<&mut Database> {
        let target = self.target;
        let path = target.path_for(plan_id)?;
        if !self.open.contains_key(path) {
            let db = Database::open(DatabaseConfig::new(path).with_busy_timeout(self.busy_timeout))?;
            self.open.insert(path.to_path_buf(), db);
        }
        self.open.get_mut(path).ok_or_else(|| Error::Shard {
            shard: path.display().to_string(),
            message: "connection vanished from cache".into(),
        })
    }
}

fn worker_share(total: usize, workers: usize, worker: usize) -> usize {
    total / workers + usize::from(worker < total % workers)
}

fn insert_worker(options: &BenchOptions, worker: usize) -> (usize, Vec<PlanId>) {
    let mut router = Router::new(&options.target, options.busy_timeout);
    let mut rng = rand::thread_rng();
    let share = worker_share(options.count, options.concurrency, worker);
    let mut inserted = Vec::with_capacity(share);

    for n in 0..share {
        let Ok(title) = Title::new(format!("bench plan {worker}-{n}")) else {
            continue;
        };
        let plan = TravelPlan::new(title, rng.gen_range(100..5000));
        let outcome = router
            .database_for(plan.id())
            .and_then(|db| db.create_plan(&plan));
        match outcome {
            Ok(id) => inserted.push(id),
            Err(e) => log::debug!("bench insert failed: {e}"),
        }
    }
    (share, inserted)
}

fn read_worker(options: &BenchOptions, ids: &[PlanId], worker: usize) -> (usize, usize) {
    let mut router = Router::new(&options.target, options.busy_timeout);
    let mut rng = rand::thread_rng();
    let share = worker_share(options.reads, options.concurrency, worker);
    let mut succeeded = 0;

    for _ in 0..share {
        let Some(&id) = ids.choose(&mut rng) else {
            break;
        };
        match router.database_for(id).and_then(|db| db.get_plan(id, false)) {
            Ok(_) => succeeded += 1,
            Err(e) => log::debug!("bench read failed: {e}"),
        }
    }
    (share, succeeded)
}

/// Runs the benchmark.
///
/// Every target database is opened once up front so schema setup happens
/// before the clock starts.
///
/// # Errors
///
/// Returns [`Error::Validation`] if `concurrency` is zero, or an error if a
/// target database cannot be opened. Failures of individual operations are
/// counted, not returned.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use wayplan::operations::bench::{run, BenchOptions, BenchTarget};
///
/// let options = BenchOptions::new(BenchTarget::Single(PathBuf::from("/tmp/bench.db")))
///     .with_count(100)
///     .with_reads(100);
/// let report = run(&options).unwrap();
/// println!("{:.0} inserts/s", report.inserts.ops_per_sec());
/// ```
pub fn run(options: &BenchOptions) -> Result<BenchReport> {
    if options.concurrency == 0 {
        return Err(Error::Validation {
            field: "concurrency".into(),
            message: "at least one worker is required".into(),
        });
    }
    for path in options.target.paths() {
        Database::open(DatabaseConfig::new(path).with_busy_timeout(options.busy_timeout))?;
    }

    let started = Instant::now();
    let insert_results: Vec<(usize, Vec<PlanId>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..options.concurrency)
            .map(|worker| scope.spawn(move || insert_worker(options, worker)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_default())
            .collect()
    });
    let insert_elapsed = started.elapsed();

    let attempted = insert_results.iter().map(|(n, _)| n).sum();
    let ids: Vec<PlanId> = insert_results.into_iter().flat_map(|(_, ids)| ids).collect();
    let inserts = PhaseReport {
        attempted,
        succeeded: ids.len(),
        elapsed: insert_elapsed,
    };
    log::info!(
        "inserted {}/{} plans in {:?}",
        inserts.succeeded,
        inserts.attempted,
        inserts.elapsed
    );

    let started = Instant::now();
    let read_results: Vec<(usize, usize)> = thread::scope(|scope| {
        let ids = &ids;
        let handles: Vec<_> = (0..options.concurrency)
            .map(|worker| scope.spawn(move || read_worker(options, ids, worker)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_default())
            .collect()
    });
    let reads = PhaseReport {
        attempted: read_results.iter().map(|(n, _)| n).sum(),
        succeeded: read_results.iter().map(|(_, ok)| ok).sum(),
        elapsed: started.elapsed(),
    };
    log::info!(
        "read {}/{} plans in {:?}",
        reads.succeeded,
        reads.attempted,
        reads.elapsed
    );

    Ok(BenchReport {
        concurrency: options.concurrency,
        inserts,
        reads,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_worker_share_covers_total() {
        let total: usize = (0..3).map(|w| worker_share(10, 3, w)).sum();
        assert_eq!(total, 10);
        assert_eq!(worker_share(10, 3, 0), 4);
        assert_eq!(worker_share(10, 3, 2), 3);
    }

    #[test]
    fn test_single_database_run() {
        let dir = tempdir().unwrap();
        let options = BenchOptions::new(BenchTarget::Single(dir.path().join("bench.db")))
            .with_count(40)
            .with_reads(30)
            .with_concurrency(4);

        let report = run(&options).unwrap();
        assert_eq!(report.inserts.attempted, 40);
        assert_eq!(report.inserts.succeeded, 40);
        assert_eq!(report.reads.attempted, 30);
        assert_eq!(report.reads.succeeded, 30);
    }

    #[test]
    fn test_sharded_run_spreads_plans() {
        let dir = tempdir().unwrap();
        let map = ShardMap::per_shard_files(dir.path());
        let options = BenchOptions::new(BenchTarget::Sharded(map.clone()))
            .with_count(64)
            .with_reads(0)
            .with_concurrency(2);

        let report = run(&options).unwrap();
        assert_eq!(report.inserts.succeeded, 64);
        assert_eq!(report.reads.attempted, 0);

        let total: usize = map
            .distinct_paths()
            .into_iter()
            .map(|path| {
                let db = Database::open(DatabaseConfig::new(path)).unwrap();
                db.list_plans(1, 1000).unwrap().len()
            })
            .sum();
        assert_eq!(total, 64);
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = tempdir().unwrap();
        let options = BenchOptions::new(BenchTarget::Single(dir.path().join("b.db")))
            .with_concurrency(0);
        assert!(matches!(run(&options), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_report_serializes_seconds() {
        let report = PhaseReport {
            attempted: 2,
            succeeded: 2,
            elapsed: Duration::from_millis(500),
        };
        assert!((report.ops_per_sec() - 4.0).abs() < f64::EPSILON);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["elapsed"], 0.5);
    }
}
