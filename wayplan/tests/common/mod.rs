//! Common test utilities for integration tests.
//!
//! Each test gets its own database file in a temporary directory. Open one
//! [`Database`] per thread from the same [`TestStore`] to exercise real
//! cross-connection locking.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use tempfile::TempDir;
use wayplan::{
    Database, DatabaseConfig, LocationId, LocationRepository, NewLocation, PlanId, Title,
    TravelPlan, TravelPlanRepository,
};

/// A database file that lives as long as the store.
pub struct TestStore {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestStore {
    /// Creates the directory and initializes the schema.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.db");
        Database::open(DatabaseConfig::new(&path)).unwrap();
        Self { _dir: dir, path }
    }

    /// Opens a fresh connection with a generous busy timeout.
    pub fn open(&self) -> Database {
        let config = DatabaseConfig::new(&self.path).with_busy_timeout(Duration::from_secs(30));
        Database::open(config).unwrap()
    }
}

/// Creates and persists a plan.
pub fn create_plan(db: &mut Database, title: &str, budget_eur: u32) -> PlanId {
    let plan = TravelPlan::new(Title::new(title).unwrap(), budget_eur);
    db.create_plan(&plan).unwrap()
}

/// Appends a location without notes.
pub fn add_location(db: &mut Database, plan_id: PlanId, name: &str, budget_eur: u32) -> LocationId {
    db.add_location(plan_id, &NewLocation::new(name, budget_eur, None).unwrap())
        .unwrap()
}

/// Location names in order.
pub fn location_names(db: &Database, plan_id: PlanId) -> Vec<String> {
    db.list_locations(plan_id)
        .unwrap()
        .iter()
        .map(|l| l.name().as_str().to_string())
        .collect()
}

/// Asserts the plan's orders are exactly `0..n`.
pub fn assert_dense(db: &Database, plan_id: PlanId) {
    let orders: Vec<u32> = db
        .list_locations(plan_id)
        .unwrap()
        .iter()
        .map(|l| l.order())
        .collect();
    let expected: Vec<u32> = (0..u32::try_from(orders.len()).unwrap()).collect();
    assert_eq!(orders, expected, "orders are not dense");
}
