//! Plans routed through a shard map land in the file named by their key.

mod common;

use std::fs;
use std::time::Duration;

use common::{add_location, location_names};
use wayplan::{
    apply_sql, Database, DatabaseConfig, PlanId, ShardMap, Title, TravelPlan,
    TravelPlanRepository,
};

const TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn test_plans_live_in_their_shard() {
    let dir = tempfile::tempdir().unwrap();
    let map = ShardMap::per_shard_files(dir.path());

    let mut placed = Vec::new();
    for i in 0..40 {
        let plan = TravelPlan::new(Title::new(format!("Plan {i}")).unwrap(), i);
        let mut db = map.open_for(plan.id(), TIMEOUT).unwrap();
        let plan_id = db.create_plan(&plan).unwrap();
        add_location(&mut db, plan_id, "Stop", 1);
        placed.push(plan_id);
    }

    for plan_id in placed {
        let expected = dir.path().join(format!("shard_{}.db", plan_id.shard_key()));
        assert_eq!(map.path_for(plan_id).unwrap(), expected);

        let db = Database::open(DatabaseConfig::new(&expected)).unwrap();
        assert_eq!(location_names(&db, plan_id), ["Stop"]);
    }
}

#[test]
fn test_mapping_file_with_shared_databases() {
    let dir = tempfile::tempdir().unwrap();
    let entries: Vec<String> = wayplan::shard::SHARD_KEYS
        .iter()
        .enumerate()
        .map(|(i, key)| format!("\"{key}\": \"pair_{}.db\"", i / 2))
        .collect();
    let mapping = dir.path().join("shards.json");
    fs::write(&mapping, format!("{{{}}}", entries.join(", "))).unwrap();

    let map = ShardMap::load(&mapping).unwrap();
    assert_eq!(map.distinct_paths().len(), 8);

    let report = apply_sql(
        &map,
        "CREATE TABLE IF NOT EXISTS notes_archive (id TEXT PRIMARY KEY, body TEXT);",
        TIMEOUT,
    )
    .unwrap();
    assert_eq!(report.databases.len(), 8);
    assert!(report
        .databases
        .iter()
        .all(|path| path.starts_with(dir.path())));
}

#[test]
fn test_unknown_plan_in_wrong_shard_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let map = ShardMap::per_shard_files(dir.path());
    let id: PlanId = "00000000-0000-4000-8000-000000000001".parse().unwrap();
    let other: PlanId = "00000000-0000-4000-8000-000000000002".parse().unwrap();

    let mut db = map.open_for(id, TIMEOUT).unwrap();
    let plan = TravelPlan::builder(Title::new("One").unwrap(), 1).id(id).build();
    db.create_plan(&plan).unwrap();

    let wrong = map.open_for(other, TIMEOUT).unwrap();
    assert!(wrong.get_plan(id, false).unwrap_err().is_not_found());
}
