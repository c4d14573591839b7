//! Travel plan persistence.

use rusqlite::{params, OptionalExtension};

use crate::error::{Error, Result};
use crate::repository::TravelPlanRepository;
use crate::{PlanId, PlanSummary, Title, TravelPlan, Version};

use super::connection::Database;
use super::locations::load_locations;
use super::rows;
use super::schema::PLAN_COLUMNS;

const INSERT_PLAN: &str = r"
    INSERT INTO travel_plans (id, title, budget_eur, version, created_at, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
";

const INSERT_LOCATION: &str = r"
    INSERT INTO locations (id, plan_id, name, position, budget_eur, notes, version)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
";

// updated_at never moves backwards, even if the clock does
const UPDATE_PLAN: &str = r"
    UPDATE travel_plans
    SET title = ?1, budget_eur = ?2, version = version + 1,
        updated_at = MAX(?3, updated_at + 1)
    WHERE id = ?4 AND version = ?5
";

impl TravelPlanRepository for Database {
    fn list_plans(&self, page: u32, page_size: u32) -> Result<Vec<PlanSummary>> {
        if page == 0 {
            return Err(Error::Validation {
                field: "page".into(),
                message: "pages start at 1".into(),
            });
        }
        if page_size == 0 {
            return Err(Error::Validation {
                field: "page_size".into(),
                message: "page size must be at least 1".into(),
            });
        }
        let Ok(offset) = i64::try_from(u64::from(page - 1) * u64::from(page_size)) else {
            return Ok(Vec::new());
        };

        let scope = self.begin_read()?;
        let mut stmt = scope.prepare(&format!(
            "SELECT {PLAN_COLUMNS} FROM travel_plans \
             ORDER BY updated_at DESC, id ASC LIMIT ?1 OFFSET ?2"
        ))?;
        let plans = stmt
            .query_map(params![page_size, offset], rows::summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plans)
    }

    fn get_plan(&self, id: PlanId, include_locations: bool) -> Result<TravelPlan> {
        let scope = self.begin_read()?;
        let key = id.to_string();
        let plan = scope
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM travel_plans WHERE id = ?1"),
                [&key],
                rows::plan,
            )
            .optional()?
            .ok_or_else(|| Error::plan_not_found(id))?;

        if !include_locations {
            return Ok(plan);
        }
        let locations = load_locations(&scope, &key)?;
        Ok(plan.with_locations(locations))
    }

    fn create_plan(&mut self, plan: &TravelPlan) -> Result<PlanId> {
        let id = plan.id();
        let key = id.to_string();
        let scope = self.begin_write()?;

        scope.run(|conn| {
            conn.execute(
                INSERT_PLAN,
                params![
                    key,
                    plan.title().as_str(),
                    plan.budget_eur(),
                    Version::INITIAL.value(),
                    rows::to_micros(plan.created_at()),
                ],
            )
        })?;

        for (index, location) in plan.locations().iter().enumerate() {
            scope.checkpoint("location insert")?;
            let position = u32::try_from(index).map_err(|_| Error::Validation {
                field: "locations".into(),
                message: "too many locations".into(),
            })?;
            scope.run(|conn| {
                conn.execute(
                    INSERT_LOCATION,
                    params![
                        location.id().to_string(),
                        key,
                        location.name().as_str(),
                        position,
                        location.budget_eur(),
                        location.notes(),
                        Version::INITIAL.value(),
                    ],
                )
            })?;
        }

        scope.commit()?;
        log::info!(
            "created travel plan {id} with {} locations",
            plan.locations().len()
        );
        Ok(id)
    }

    fn update_plan(
        &mut self,
        id: PlanId,
        title: &Title,
        budget_eur: u32,
        expected_version: Version,
    ) -> Result<Version> {
        let key = id.to_string();
        let now = rows::to_micros(chrono::Utc::now());
        let scope = self.begin_write()?;

        let changed = scope.run(|conn| {
            conn.execute(
                UPDATE_PLAN,
                params![
                    title.as_str(),
                    budget_eur,
                    now,
                    key,
                    expected_version.value()
                ],
            )
        })?;

        if changed == 0 {
            let actual: Option<u32> = scope.run(|conn| {
                conn.query_row(
                    "SELECT version FROM travel_plans WHERE id = ?1",
                    [&key],
                    |row| row.get(0),
                )
                .optional()
            })?;
            return Err(match actual {
                None => Error::plan_not_found(id),
                Some(actual) => {
                    log::warn!(
                        "rejected update of travel plan {id}: expected version {expected_version}, found {actual}"
                    );
                    Error::version_conflict(format!("travel plan {id}"), expected_version, actual)
                }
            });
        }

        scope.commit()?;
        let version = expected_version.next();
        log::debug!("updated travel plan {id} to version {version}");
        Ok(version)
    }

    fn delete_plan(&mut self, id: PlanId) -> Result<bool> {
        let key = id.to_string();
        let scope = self.begin_write()?;

        let locations = scope.run(|conn| {
            conn.execute("DELETE FROM locations WHERE plan_id = ?1", [&key])
        })?;
        scope.checkpoint("locations deleted")?;
        let deleted = scope.run(|conn| {
            conn.execute("DELETE FROM travel_plans WHERE id = ?1", [&key])
        })?;

        scope.commit()?;
        if deleted > 0 {
            log::info!("deleted travel plan {id} and {locations} locations");
        }
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{create_test_database, create_test_plan};
    use crate::repository::LocationRepository;
    use crate::{Location, LocationName, NewLocation};

    #[test]
    fn test_create_and_get_plan() {
        let mut db = create_test_database();
        let plan = create_test_plan("Japan Trip", 2000);
        let id = db.create_plan(&plan).unwrap();
        assert_eq!(id, plan.id());

        let stored = db.get_plan(id, false).unwrap();
        assert_eq!(stored.title().as_str(), "Japan Trip");
        assert_eq!(stored.budget_eur(), 2000);
        assert_eq!(stored.version(), Version::INITIAL);
        assert_eq!(stored.created_at(), plan.created_at());
        assert_eq!(stored.created_at(), stored.updated_at());
    }

    #[test]
    fn test_create_plan_with_locations_renumbers() {
        let mut db = create_test_database();
        let plan_id = PlanId::new();
        let locations = vec![
            Location::builder(plan_id, LocationName::new("Osaka").unwrap(), 7).build(),
            Location::builder(plan_id, LocationName::new("Tokyo").unwrap(), 3).build(),
        ];
        let plan = TravelPlan::builder(Title::new("Trip").unwrap(), 10)
            .id(plan_id)
            .locations(locations)
            .build();
        db.create_plan(&plan).unwrap();

        let stored = db.get_plan(plan_id, true).unwrap();
        let names: Vec<_> = stored
            .locations()
            .iter()
            .map(|l| (l.name().as_str().to_string(), l.order()))
            .collect();
        assert_eq!(names, [("Tokyo".to_string(), 0), ("Osaka".to_string(), 1)]);
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let mut db = create_test_database();
        let plan = create_test_plan("Trip", 1);
        db.create_plan(&plan).unwrap();
        assert!(db.create_plan(&plan).unwrap_err().is_storage_failure());
    }

    #[test]
    fn test_get_missing_plan() {
        let db = create_test_database();
        assert!(db.get_plan(PlanId::new(), true).unwrap_err().is_not_found());
    }

    #[test]
    fn test_get_plan_without_locations_leaves_them_empty() {
        let mut db = create_test_database();
        let id = db.create_plan(&create_test_plan("Trip", 1)).unwrap();
        db.add_location(id, &NewLocation::new("Rome", 5, None).unwrap())
            .unwrap();

        assert!(db.get_plan(id, false).unwrap().locations().is_empty());
        assert_eq!(db.get_plan(id, true).unwrap().locations().len(), 1);
    }

    #[test]
    fn test_update_plan_bumps_version() {
        let mut db = create_test_database();
        let id = db.create_plan(&create_test_plan("Trip", 1)).unwrap();
        let title = Title::new("Better Trip").unwrap();

        let version = db.update_plan(id, &title, 99, Version::INITIAL).unwrap();
        assert_eq!(version.value(), 2);

        let stored = db.get_plan(id, false).unwrap();
        assert_eq!(stored.title(), &title);
        assert_eq!(stored.budget_eur(), 99);
        assert_eq!(stored.version(), version);
        assert!(stored.updated_at() > stored.created_at());
    }

    #[test]
    fn test_update_plan_stale_version() {
        let mut db = create_test_database();
        let id = db.create_plan(&create_test_plan("Trip", 1)).unwrap();
        let title = Title::new("Trip").unwrap();
        db.update_plan(id, &title, 2, Version::INITIAL).unwrap();

        let err = db.update_plan(id, &title, 3, Version::INITIAL).unwrap_err();
        match err {
            Error::VersionConflict {
                expected, actual, ..
            } => {
                assert_eq!(expected.value(), 1);
                assert_eq!(actual.value(), 2);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(db.get_plan(id, false).unwrap().budget_eur(), 2);
    }

    #[test]
    fn test_update_past_max_version_fails() {
        let mut db = create_test_database();
        let id = db.create_plan(&create_test_plan("Trip", 1)).unwrap();
        db.connection()
            .execute(
                "UPDATE travel_plans SET version = ?1 WHERE id = ?2",
                params![u32::MAX, id.to_string()],
            )
            .unwrap();
        let max = Version::try_from(u32::MAX).unwrap();

        let title = Title::new("Trip").unwrap();
        let err = db.update_plan(id, &title, 2, max).unwrap_err();
        assert!(matches!(err, Error::Database(_)), "got {err:?}");

        let stored = db.get_plan(id, false).unwrap();
        assert_eq!(stored.version(), max);
        assert_eq!(stored.budget_eur(), 1);
    }

    #[test]
    fn test_update_missing_plan() {
        let mut db = create_test_database();
        let title = Title::new("Trip").unwrap();
        let err = db
            .update_plan(PlanId::new(), &title, 1, Version::INITIAL)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_plan_cascades() {
        let mut db = create_test_database();
        let id = db.create_plan(&create_test_plan("Trip", 1)).unwrap();
        db.add_location(id, &NewLocation::new("A", 1, None).unwrap())
            .unwrap();
        db.add_location(id, &NewLocation::new("B", 1, None).unwrap())
            .unwrap();

        assert!(db.delete_plan(id).unwrap());
        assert!(db.get_plan(id, true).unwrap_err().is_not_found());

        let orphans: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM locations", [], |r| r.get(0))
            .unwrap();
        assert_eq!(orphans, 0);
        assert!(!db.delete_plan(id).unwrap());
    }

    #[test]
    fn test_list_plans_validation() {
        let db = create_test_database();
        assert!(matches!(
            db.list_plans(0, 10),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            db.list_plans(1, 0),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_list_plans_orders_by_update() {
        let mut db = create_test_database();
        let first = db.create_plan(&create_test_plan("First", 1)).unwrap();
        let second = db.create_plan(&create_test_plan("Second", 1)).unwrap();
        db.update_plan(first, &Title::new("First").unwrap(), 2, Version::INITIAL)
            .unwrap();

        let ids: Vec<_> = db
            .list_plans(1, 10)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, [first, second]);
    }

    #[test]
    fn test_list_plans_past_last_page() {
        let mut db = create_test_database();
        db.create_plan(&create_test_plan("Only", 1)).unwrap();
        assert!(db.list_plans(2, 10).unwrap().is_empty());
        assert!(db.list_plans(u32::MAX, u32::MAX).unwrap().is_empty());
    }

    #[test]
    fn test_cancelled_update_leaves_plan_untouched() {
        let mut db = create_test_database();
        let id = db.create_plan(&create_test_plan("Trip", 1)).unwrap();
        db.cancellation_token().cancel();

        let err = db
            .update_plan(id, &Title::new("Other").unwrap(), 5, Version::INITIAL)
            .unwrap_err();
        assert!(err.is_cancelled());

        db.reset_cancellation();
        let stored = db.get_plan(id, false).unwrap();
        assert_eq!(stored.version(), Version::INITIAL);
        assert_eq!(stored.budget_eur(), 1);
    }
}
