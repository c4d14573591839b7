//! Database layer for persistent storage of travel plans.
//!
//! This module provides a SQLite-based storage layer: connection
//! management, schema versioning, scoped transactions and the repository
//! implementations for plans and locations.
//!
//! # Examples
//!
//! ```no_run
//! use wayplan::database::{Database, DatabaseConfig};
//! use wayplan::{NewLocation, Title, TravelPlan, TravelPlanRepository, LocationRepository};
//!
//! let mut db = Database::open(DatabaseConfig::new("/tmp/wayplan.db")).unwrap();
//!
//! let plan = TravelPlan::new(Title::new("Japan Trip").unwrap(), 2000);
//! let plan_id = db.create_plan(&plan).unwrap();
//! db.add_location(plan_id, &NewLocation::new("Tokyo", 800, None).unwrap())
//!     .unwrap();
//!
//! for summary in db.list_plans(1, 20).unwrap() {
//!     println!("{} v{}", summary.title, summary.version);
//! }
//! ```

mod config;
mod connection;
mod locations;
pub mod migrations;
mod ordering;
mod plans;
mod rows;
mod schema;
mod transaction;

#[cfg(test)]
pub mod test_util;

pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig,
    DATABASE_FILE_NAME, DATA_DIR_ENV, DEFAULT_BUSY_TIMEOUT_MS,
};
pub use connection::Database;
pub use schema::CURRENT_SCHEMA_VERSION;

pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
