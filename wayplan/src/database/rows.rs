//! Row conversions between `SQLite` and the domain types.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

use crate::location::Notes;
use crate::{Location, LocationId, LocationName, PlanId, PlanSummary, Title, TravelPlan, Version};

fn conversion_error(
    idx: usize,
    ty: Type,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(err))
}

#[derive(Debug)]
struct OutOfRangeTimestamp(i64);

impl std::fmt::Display for OutOfRangeTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timestamp {} is out of range", self.0)
    }
}

impl std::error::Error for OutOfRangeTimestamp {}

pub(super) fn to_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let micros: i64 = row.get(idx)?;
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| conversion_error(idx, Type::Integer, OutOfRangeTimestamp(micros)))
}

fn version(row: &Row<'_>, idx: usize) -> rusqlite::Result<Version> {
    let raw: u32 = row.get(idx)?;
    Version::try_from(raw).map_err(|e| conversion_error(idx, Type::Integer, e))
}

fn plan_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<PlanId> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, Type::Text, e))
}

fn location_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<LocationId> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| conversion_error(idx, Type::Text, e))
}

/// Maps a row selected with `PLAN_COLUMNS`.
pub(super) fn plan(row: &Row<'_>) -> rusqlite::Result<TravelPlan> {
    let title: String = row.get(1)?;
    let title = Title::new(title).map_err(|e| conversion_error(1, Type::Text, e))?;
    Ok(TravelPlan::builder(title, row.get(2)?)
        .id(plan_id(row, 0)?)
        .version(version(row, 3)?)
        .created_at(timestamp(row, 4)?)
        .updated_at(timestamp(row, 5)?)
        .build())
}

/// Maps a row selected with `PLAN_COLUMNS` into a listing entry.
pub(super) fn summary(row: &Row<'_>) -> rusqlite::Result<PlanSummary> {
    Ok(PlanSummary {
        id: plan_id(row, 0)?,
        title: row.get(1)?,
        budget_eur: row.get(2)?,
        version: version(row, 3)?,
        updated_at: timestamp(row, 5)?,
    })
}

/// Maps a row selected with `LOCATION_COLUMNS`.
pub(super) fn location(row: &Row<'_>) -> rusqlite::Result<Location> {
    let name: String = row.get(2)?;
    let name = LocationName::new(name).map_err(|e| conversion_error(2, Type::Text, e))?;
    let notes: Option<String> = row.get(5)?;
    let notes = Notes::parse(notes).map_err(|e| conversion_error(5, Type::Text, e))?;
    Ok(Location::builder(plan_id(row, 1)?, name, row.get(3)?)
        .id(location_id(row, 0)?)
        .budget_eur(row.get(4)?)
        .notes(notes)
        .version(version(row, 6)?)
        .build())
}
