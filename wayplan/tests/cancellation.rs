//! Cancellation leaves no partial state behind.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use common::{add_location, assert_dense, create_plan, location_names, TestStore};
use wayplan::{
    Database, DatabaseConfig, Error, LocationRepository, LocationUpdate, NewLocation, Title,
    PlanId, TravelPlanRepository, Version,
};

fn open_with_timeout(store: &TestStore, timeout: Duration) -> Database {
    Database::open(DatabaseConfig::new(&store.path).with_busy_timeout(timeout)).unwrap()
}

fn rename(db: &mut Database, plan_id: PlanId) -> wayplan::Result<Version> {
    let title = Title::new("Renamed").unwrap();
    db.update_plan(plan_id, &title, 2, Version::INITIAL)
}

#[test]
fn test_cancelled_calls_change_nothing() {
    let store = TestStore::new();
    let mut db = store.open();
    let plan_id = create_plan(&mut db, "Trip", 1);
    let a = add_location(&mut db, plan_id, "A", 1);
    add_location(&mut db, plan_id, "B", 1);

    db.cancellation_token().cancel();

    let new = NewLocation::new("C", 1, None).unwrap();
    assert!(matches!(db.add_location(plan_id, &new), Err(Error::Cancelled)));
    assert!(matches!(db.delete_location(plan_id, a), Err(Error::Cancelled)));
    assert!(matches!(db.delete_plan(plan_id), Err(Error::Cancelled)));
    assert!(matches!(db.list_plans(1, 10), Err(Error::Cancelled)));

    db.reset_cancellation();
    assert_eq!(location_names(&db, plan_id), ["A", "B"]);
    assert!(db.get_plan(plan_id, false).is_ok());
}

#[test]
fn test_other_connections_are_unaffected() {
    let store = TestStore::new();
    let mut cancelled = store.open();
    let mut live = store.open();
    cancelled.cancellation_token().cancel();

    let plan_id = create_plan(&mut live, "Trip", 1);
    assert!(cancelled.get_plan(plan_id, false).unwrap_err().is_cancelled());
    assert!(live.get_plan(plan_id, false).is_ok());
}

#[test]
fn test_cancel_from_another_thread_mid_stream() {
    let store = TestStore::new();
    let mut db = store.open();
    let plan_id = create_plan(&mut db, "Trip", 1);
    for i in 0..5 {
        add_location(&mut db, plan_id, &format!("L{i}"), 1);
    }

    let token = db.cancellation_token();
    let barrier = Arc::new(Barrier::new(2));
    let canceller = {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            token.cancel();
        })
    };

    barrier.wait();
    let mut completed = 0u32;
    loop {
        let Ok(locations) = db.list_locations(plan_id) else {
            break;
        };
        let last = &locations[locations.len() - 1];
        match db.update_location(plan_id, last.id(), &LocationUpdate::reorder(last, 0)) {
            Ok(_) => completed += 1,
            Err(e) => {
                assert!(e.is_cancelled(), "unexpected error: {e}");
                break;
            }
        }
    }
    canceller.join().unwrap();

    db.reset_cancellation();
    assert_dense(&db, plan_id);
    assert_eq!(db.list_locations(plan_id).unwrap().len(), 5);
    // every completed move rotated the list by one
    let rotation = usize::try_from(completed % 5).unwrap();
    let mut expected: Vec<String> = (0..5).map(|i| format!("L{i}")).collect();
    expected.rotate_right(rotation);
    assert_eq!(location_names(&db, plan_id), expected);
}

#[test]
fn test_cancel_while_waiting_for_write_lock() {
    let store = TestStore::new();
    let mut setup = store.open();
    let plan_id = create_plan(&mut setup, "Trip", 1);

    // open before the lock is held; opening checks the schema under it
    let mut waiter = open_with_timeout(&store, Duration::from_secs(3));
    let holder = store.open();
    holder.connection().execute_batch("BEGIN IMMEDIATE").unwrap();

    let token = waiter.cancellation_token();
    let handle = thread::spawn(move || {
        let started = Instant::now();
        let result = rename(&mut waiter, plan_id);
        (started.elapsed(), result)
    });

    thread::sleep(Duration::from_millis(100));
    token.cancel();
    let (elapsed, result) = handle.join().unwrap();

    assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");

    holder.connection().execute_batch("ROLLBACK").unwrap();
    let plan = setup.get_plan(plan_id, false).unwrap();
    assert_eq!(plan.version(), Version::INITIAL);
    assert_eq!(plan.title().as_str(), "Trip");
}

#[test]
fn test_lock_wait_still_times_out_without_cancel() {
    let store = TestStore::new();
    let mut setup = store.open();
    let plan_id = create_plan(&mut setup, "Trip", 1);

    let mut waiter = open_with_timeout(&store, Duration::from_millis(300));
    let holder = store.open();
    holder.connection().execute_batch("BEGIN IMMEDIATE").unwrap();

    let started = Instant::now();
    let result = rename(&mut waiter, plan_id);

    assert!(matches!(result, Err(Error::LockTimeout { .. })), "got {result:?}");
    assert!(started.elapsed() >= Duration::from_millis(250));
    holder.connection().execute_batch("ROLLBACK").unwrap();
}

#[test]
fn test_waiter_proceeds_once_lock_is_released() {
    let store = TestStore::new();
    let mut setup = store.open();
    let plan_id = create_plan(&mut setup, "Trip", 1);

    let mut waiter = open_with_timeout(&store, Duration::from_secs(5));
    let holder = store.open();
    holder.connection().execute_batch("BEGIN IMMEDIATE").unwrap();

    let handle = thread::spawn(move || rename(&mut waiter, plan_id));

    thread::sleep(Duration::from_millis(200));
    holder.connection().execute_batch("COMMIT").unwrap();

    assert_eq!(handle.join().unwrap().unwrap(), Version::INITIAL.next());
}
