#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # wayplan
//!
//! A library for storing travel plans and their ordered locations with
//! optimistic concurrency control.
//!
//! Every write carries the version the caller last read. A write against a
//! stale version is rejected with [`Error::VersionConflict`] and changes
//! nothing. Locations of a plan always occupy the positions `0..n`, and
//! every repository call runs in its own `SQLite` transaction.
//!
//! ## Core Types
//!
//! - [`TravelPlan`] and [`Location`]: the aggregate and its children
//! - [`TravelPlanRepository`] and [`LocationRepository`]: persistence
//!   contracts, implemented by [`Database`]
//! - [`Version`], [`PlanId`] and [`LocationId`]: version stamps and identifiers
//! - [`Error`] and [`Result`]: error handling types
//! - [`ShardMap`]: routing plans across several database files
//!
//! ## Examples
//!
//! ```
//! use wayplan::{Database, DatabaseConfig, NewLocation, Title, TravelPlan};
//! use wayplan::{LocationRepository, TravelPlanRepository};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let mut db = Database::open(DatabaseConfig::new(dir.path().join("plans.db"))).unwrap();
//!
//! let plan = TravelPlan::new(Title::new("Japan Trip").unwrap(), 2000);
//! let plan_id = db.create_plan(&plan).unwrap();
//! db.add_location(plan_id, &NewLocation::new("Tokyo", 800, None).unwrap())
//!     .unwrap();
//!
//! let stored = db.get_plan(plan_id, true).unwrap();
//! assert_eq!(stored.locations()[0].name().as_str(), "Tokyo");
//! assert_eq!(stored.version().value(), 1);
//! ```

pub mod cancel;
pub mod config;
pub mod database;
pub mod error;
pub mod id;
pub mod location;
pub mod logging;
pub mod operations;
pub mod plan;
pub mod repository;
pub mod shard;
pub mod summary;
pub mod version;

// Re-export key types at crate root for convenience
pub use cancel::CancellationToken;
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use id::{LocationId, PlanId};
pub use location::{Location, LocationName, LocationUpdate, NewLocation, Notes};
pub use logging::{init_logger, resolve_level, set_log_level, LogLevel, Logger};
pub use plan::{Title, TravelPlan};
pub use repository::{LocationRepository, TravelPlanRepository};
pub use shard::{apply_sql, ApplyReport, ShardMap};
pub use summary::{LocationItem, PlanDetail, PlanSummary};
pub use version::Version;
