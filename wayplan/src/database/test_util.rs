//! Shared test utilities for database unit tests.

use tempfile::tempdir;

use crate::database::{Database, DatabaseConfig};
use crate::{Title, TravelPlan};

/// Creates a temporary test database that will be cleaned up automatically.
///
/// # Panics
///
/// Panics if the temporary directory or database cannot be created.
#[must_use]
pub fn create_test_database() -> Database {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(DatabaseConfig::new(path)).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    db
}

/// Creates an unsaved plan with a fresh id.
///
/// # Panics
///
/// Panics if the title is invalid.
#[must_use]
pub fn create_test_plan(title: &str, budget_eur: u32) -> TravelPlan {
    TravelPlan::new(Title::new(title).unwrap(), budget_eur)
}
