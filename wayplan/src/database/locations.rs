//! Location persistence and ordering.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Error, Result};
use crate::repository::LocationRepository;
use crate::{Location, LocationId, LocationUpdate, NewLocation, PlanId, Version};

use super::connection::Database;
use super::ordering;
use super::rows;
use super::schema::LOCATION_COLUMNS;

const PLAN_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM travel_plans WHERE id = ?1)";

const UPDATE_LOCATION: &str = r"
    UPDATE locations
    SET name = ?1, budget_eur = ?2, notes = ?3, version = version + 1
    WHERE id = ?4 AND plan_id = ?5 AND version = ?6
";

/// Loads a plan's locations ordered by position.
pub(super) fn load_locations(conn: &Connection, plan_key: &str) -> rusqlite::Result<Vec<Location>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOCATION_COLUMNS} FROM locations WHERE plan_id = ?1 ORDER BY position"
    ))?;
    let locations = stmt
        .query_map([plan_key], rows::location)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(locations)
}

fn plan_exists(conn: &Connection, plan_key: &str) -> rusqlite::Result<bool> {
    conn.query_row(PLAN_EXISTS, [plan_key], |row| row.get(0))
}

impl LocationRepository for Database {
    fn list_locations(&self, plan_id: PlanId) -> Result<Vec<Location>> {
        let scope = self.begin_read()?;
        let key = plan_id.to_string();
        if !plan_exists(&scope, &key)? {
            return Err(Error::plan_not_found(plan_id));
        }
        Ok(load_locations(&scope, &key)?)
    }

    fn get_location(&self, plan_id: PlanId, location_id: LocationId) -> Result<Location> {
        let scope = self.begin_read()?;
        scope
            .query_row(
                &format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ?1 AND plan_id = ?2"),
                params![location_id.to_string(), plan_id.to_string()],
                rows::location,
            )
            .optional()?
            .ok_or_else(|| Error::location_not_found(location_id))
    }

    fn add_location(&mut self, plan_id: PlanId, location: &NewLocation) -> Result<LocationId> {
        let key = plan_id.to_string();
        let id = LocationId::new();
        let scope = self.begin_write()?;

        if !scope.run(|conn| plan_exists(conn, &key))? {
            return Err(Error::plan_not_found(plan_id));
        }
        let position = scope.run(|conn| ordering::location_count(conn, &key))?;
        scope.checkpoint("position assigned")?;

        scope.run(|conn| {
            conn.execute(
                "INSERT INTO locations (id, plan_id, name, position, budget_eur, notes, version) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.to_string(),
                    key,
                    location.name.as_str(),
                    position,
                    location.budget_eur,
                    location.notes.as_ref().map(|n| n.as_str()),
                    Version::INITIAL.value(),
                ],
            )
        })?;

        scope.commit()?;
        log::debug!("added location {id} to travel plan {plan_id} at position {position}");
        Ok(id)
    }

    fn update_location(
        &mut self,
        plan_id: PlanId,
        location_id: LocationId,
        update: &LocationUpdate,
    ) -> Result<Version> {
        let plan_key = plan_id.to_string();
        let key = location_id.to_string();
        let expected = update.expected_version;
        let scope = self.begin_write()?;

        let changed = scope.run(|conn| {
            conn.execute(
                UPDATE_LOCATION,
                params![
                    update.name.as_str(),
                    update.budget_eur,
                    update.notes.as_ref().map(|n| n.as_str()),
                    key,
                    plan_key,
                    expected.value(),
                ],
            )
        })?;

        if changed == 0 {
            let actual: Option<u32> = scope.run(|conn| {
                conn.query_row(
                    "SELECT version FROM locations WHERE id = ?1 AND plan_id = ?2",
                    params![key, plan_key],
                    |row| row.get(0),
                )
                .optional()
            })?;
            return Err(match actual {
                None => Error::location_not_found(location_id),
                Some(actual) => {
                    log::warn!(
                        "rejected update of location {location_id}: expected version {expected}, found {actual}"
                    );
                    Error::version_conflict(format!("location {location_id}"), expected, actual)
                }
            });
        }

        if let Some(order) = update.new_order {
            scope.checkpoint("reorder")?;
            scope.run(|conn| ordering::move_to(conn, &plan_key, &key, i64::from(order)))?;
        }

        scope.commit()?;
        Ok(expected.next())
    }

    fn delete_location(&mut self, plan_id: PlanId, location_id: LocationId) -> Result<bool> {
        let plan_key = plan_id.to_string();
        let key = location_id.to_string();
        let scope = self.begin_write()?;

        let position: Option<i64> = scope.run(|conn| {
            conn.query_row(
                "SELECT position FROM locations WHERE id = ?1 AND plan_id = ?2",
                params![key, plan_key],
                |row| row.get(0),
            )
            .optional()
        })?;
        let Some(position) = position else {
            return Ok(false);
        };

        scope.run(|conn| conn.execute("DELETE FROM locations WHERE id = ?1", [&key]))?;
        scope.checkpoint("location deleted")?;
        let shifted = scope.run(|conn| ordering::close_gap(conn, &plan_key, position))?;

        scope.commit()?;
        log::debug!("deleted location {location_id}, shifted {shifted} successors");
        Ok(true)
    }
}
