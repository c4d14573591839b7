//! Database schema definitions and SQL constants.
//!
//! This module contains all SQL table definitions, indices, and constants
//! related to the database schema for travel plans and their locations.

/// Current schema version for the database.
///
/// This version is stored in the metadata table and is used to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the travel plans table.
///
/// Timestamps are microseconds since the Unix epoch, UTC. Versions stay
/// within `u32`, so a write past `u32::MAX` fails its check.
pub const CREATE_TRAVEL_PLANS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS travel_plans (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        budget_eur INTEGER NOT NULL CHECK (budget_eur >= 0),
        version INTEGER NOT NULL CHECK (version BETWEEN 1 AND 4294967295),
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )";

/// SQL statement to create the locations table.
///
/// `plan_id` is a plain foreign key; deleting a plan removes its locations
/// explicitly inside the same transaction. `position` has no sign check
/// because reordering parks rows at negative positions mid-transaction.
pub const CREATE_LOCATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS locations (
        id TEXT PRIMARY KEY NOT NULL,
        plan_id TEXT NOT NULL REFERENCES travel_plans(id),
        name TEXT NOT NULL,
        position INTEGER NOT NULL,
        budget_eur INTEGER NOT NULL CHECK (budget_eur >= 0),
        notes TEXT,
        version INTEGER NOT NULL CHECK (version BETWEEN 1 AND 4294967295)
    )";

/// Unique index guaranteeing no two locations of a plan share a position.
pub const CREATE_PLAN_POSITION_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     idx_locations_plan_position ON locations(plan_id, position)";

/// Index backing the most-recently-updated-first listing.
pub const CREATE_UPDATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_travel_plans_updated_at ON travel_plans(updated_at)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

pub(super) const PLAN_COLUMNS: &str = "id, title, budget_eur, version, created_at, updated_at";

pub(super) const LOCATION_COLUMNS: &str =
    "id, plan_id, name, position, budget_eur, notes, version";
