//! Dense position maintenance for a plan's locations.
//!
//! Positions of a plan are always `0..n`, guarded by a unique index on
//! `(plan_id, position)`. A single `UPDATE ... SET position = position + 1`
//! can trip that index mid-statement, so ranges move in two steps through
//! negative positions. The row being moved waits at [`PARKED`].

use rusqlite::{params, Connection, OptionalExtension};

/// Position a moving row waits at while its neighbours shift.
pub(super) const PARKED: i64 = -1;

/// Shifts the positions `from..=to` of a plan by `delta`.
///
/// Every shifted row gets its version bumped once, so a caller holding a
/// neighbour read before the shift sees a conflict on its next write.
///
/// The caller guarantees the target range `from + delta..=to + delta` is
/// free once the range itself has moved out of the way, which holds when
/// the vacated slot belongs to a parked or deleted row.
pub(super) fn shift_range(
    conn: &Connection,
    plan_id: &str,
    from: i64,
    to: i64,
    delta: i64,
) -> rusqlite::Result<usize> {
    if from > to {
        return Ok(0);
    }
    // p -> -(p + delta) - 2 keeps every row below PARKED and distinct
    let moved = conn.execute(
        "UPDATE locations SET position = -(position + ?3) - 2, version = version + 1 \
         WHERE plan_id = ?1 AND position BETWEEN ?2 AND ?4",
        params![plan_id, from, delta, to],
    )?;
    conn.execute(
        "UPDATE locations SET position = -(position + 2) \
         WHERE plan_id = ?1 AND position <= -2",
        params![plan_id],
    )?;
    Ok(moved)
}

/// Number of locations in a plan, which is also the next free position.
pub(super) fn location_count(conn: &Connection, plan_id: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM locations WHERE plan_id = ?1",
        [plan_id],
        |row| row.get(0),
    )
}

/// Moves one location to `target`, clamped to the last position.
///
/// Returns the final position.
pub(super) fn move_to(
    conn: &Connection,
    plan_id: &str,
    location_id: &str,
    target: i64,
) -> rusqlite::Result<i64> {
    let current: Option<i64> = conn
        .query_row(
            "SELECT position FROM locations WHERE id = ?1 AND plan_id = ?2",
            params![location_id, plan_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(current) = current else {
        return Err(rusqlite::Error::QueryReturnedNoRows);
    };

    let last = location_count(conn, plan_id)? - 1;
    let target = target.clamp(0, last.max(0));
    if target == current {
        return Ok(current);
    }

    conn.execute(
        "UPDATE locations SET position = ?2 WHERE id = ?1",
        params![location_id, PARKED],
    )?;
    if target < current {
        shift_range(conn, plan_id, target, current - 1, 1)?;
    } else {
        shift_range(conn, plan_id, current + 1, target, -1)?;
    }
    conn.execute(
        "UPDATE locations SET position = ?2 WHERE id = ?1",
        params![location_id, target],
    )?;

    log::debug!("moved location {location_id} from {current} to {target}");
    Ok(target)
}

/// Closes the gap left by a removed location at `removed`.
pub(super) fn close_gap(conn: &Connection, plan_id: &str, removed: i64) -> rusqlite::Result<usize> {
    shift_range(conn, plan_id, removed + 1, i64::MAX - 2, -1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::initialize_schema;

    fn setup(names: &[&str]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO travel_plans VALUES ('p', 'Trip', 0, 1, 0, 0)",
            [],
        )
        .unwrap();
        for (i, name) in names.iter().enumerate() {
            conn.execute(
                "INSERT INTO locations VALUES (?1, 'p', ?1, ?2, 0, NULL, 1)",
                params![name, i64::try_from(i).unwrap()],
            )
            .unwrap();
        }
        conn
    }

    fn ordered(conn: &Connection) -> Vec<(String, i64)> {
        let mut stmt = conn
            .prepare("SELECT id, position FROM locations WHERE plan_id = 'p' ORDER BY position")
            .unwrap();
        stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap()
    }

    fn names(conn: &Connection) -> Vec<String> {
        ordered(conn).into_iter().map(|(id, _)| id).collect()
    }

    fn assert_dense(conn: &Connection) {
        let positions: Vec<i64> = ordered(conn).into_iter().map(|(_, p)| p).collect();
        let expected: Vec<i64> = (0..i64::try_from(positions.len()).unwrap()).collect();
        assert_eq!(positions, expected);
    }

    #[test]
    fn test_move_backward() {
        let conn = setup(&["a", "b", "c", "d"]);
        assert_eq!(move_to(&conn, "p", "d", 1).unwrap(), 1);
        assert_eq!(names(&conn), ["a", "d", "b", "c"]);
        assert_dense(&conn);
    }

    #[test]
    fn test_move_forward() {
        let conn = setup(&["a", "b", "c", "d"]);
        assert_eq!(move_to(&conn, "p", "a", 2).unwrap(), 2);
        assert_eq!(names(&conn), ["b", "c", "a", "d"]);
        assert_dense(&conn);
    }

    #[test]
    fn test_move_past_end_clamps() {
        let conn = setup(&["a", "b", "c"]);
        assert_eq!(move_to(&conn, "p", "a", 99).unwrap(), 2);
        assert_eq!(names(&conn), ["b", "c", "a"]);
        assert_dense(&conn);
    }

    #[test]
    fn test_move_to_same_position_is_noop() {
        let conn = setup(&["a", "b"]);
        assert_eq!(move_to(&conn, "p", "b", 1).unwrap(), 1);
        assert_eq!(names(&conn), ["a", "b"]);
    }

    #[test]
    fn test_move_missing_location() {
        let conn = setup(&["a"]);
        assert!(matches!(
            move_to(&conn, "p", "zz", 0),
            Err(rusqlite::Error::QueryReturnedNoRows)
        ));
    }

    #[test]
    fn test_close_gap() {
        let conn = setup(&["a", "b", "c", "d"]);
        conn.execute("DELETE FROM locations WHERE id = 'b'", [])
            .unwrap();
        assert_eq!(close_gap(&conn, "p", 1).unwrap(), 2);
        assert_eq!(names(&conn), ["a", "c", "d"]);
        assert_dense(&conn);
    }

    #[test]
    fn test_close_gap_at_end() {
        let conn = setup(&["a", "b"]);
        conn.execute("DELETE FROM locations WHERE id = 'b'", [])
            .unwrap();
        assert_eq!(close_gap(&conn, "p", 1).unwrap(), 0);
        assert_dense(&conn);
    }

    fn version(conn: &Connection, id: &str) -> i64 {
        conn.query_row("SELECT version FROM locations WHERE id = ?1", [id], |r| {
            r.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_shift_bumps_each_shifted_row_once() {
        let conn = setup(&["a", "b", "c", "d"]);
        move_to(&conn, "p", "d", 1).unwrap();
        assert_eq!(version(&conn, "a"), 1);
        assert_eq!(version(&conn, "b"), 2);
        assert_eq!(version(&conn, "c"), 2);
        // the moved row is versioned by its caller
        assert_eq!(version(&conn, "d"), 1);
    }

    #[test]
    fn test_shift_leaves_other_plans_alone() {
        let conn = setup(&["a", "b"]);
        conn.execute(
            "INSERT INTO travel_plans VALUES ('q', 'Other', 0, 1, 0, 0)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO locations VALUES ('x', 'q', 'x', 0, 0, NULL, 1)",
            [],
        )
        .unwrap();

        move_to(&conn, "p", "b", 0).unwrap();
        let other: i64 = conn
            .query_row("SELECT position FROM locations WHERE id = 'x'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(other, 0);
    }
}
