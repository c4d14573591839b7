//! Scoped transactions with cancellation checkpoints.
//!
//! Every repository write runs inside a [`WriteScope`]: an `IMMEDIATE`
//! transaction that takes the store's write lock up front, checks the
//! connection's cancellation token at each stage and rolls back when
//! dropped without [`WriteScope::commit`].
//!
//! The write lock is requested in short slices of [`LOCK_POLL_INTERVAL`] so
//! a cancelled caller stops waiting within one slice instead of sitting out
//! the whole busy timeout.

use std::ops::Deref;
use std::time::{Duration, Instant};

use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};

use crate::cancel::{checkpoint, CancellationToken};
use crate::error::{Error, Result};

use super::connection::Database;

/// Longest single wait for the write lock between cancellation checks.
pub(super) const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// Maps lock contention to [`Error::LockTimeout`] and an interrupted
/// statement to [`Error::Cancelled`].
pub(super) fn storage_error(err: rusqlite::Error, busy_timeout: Duration) -> Error {
    if is_busy(&err) {
        return Error::LockTimeout {
            seconds: busy_timeout.as_secs(),
        };
    }
    match err.sqlite_error_code() {
        Some(ErrorCode::OperationInterrupted) => Error::Cancelled,
        _ => Error::Database(err),
    }
}

/// Takes the write lock, polling until `busy_timeout` runs out.
///
/// The connection's busy timeout is left at the last slice; the caller
/// restores it.
fn acquire_write_lock<'conn>(
    conn: &'conn Connection,
    cancel: &CancellationToken,
    busy_timeout: Duration,
) -> Result<Transaction<'conn>> {
    let deadline = Instant::now() + busy_timeout;
    loop {
        checkpoint(cancel, "waiting for write lock")?;
        let slice = deadline
            .saturating_duration_since(Instant::now())
            .min(LOCK_POLL_INTERVAL);
        conn.busy_timeout(slice)?;

        match Transaction::new_unchecked(conn, TransactionBehavior::Immediate) {
            Ok(tx) => return Ok(tx),
            Err(e) if is_busy(&e) && Instant::now() < deadline => {}
            Err(e) => return Err(storage_error(e, busy_timeout)),
        }
    }
}

pub(super) struct WriteScope<'conn> {
    tx: Transaction<'conn>,
    cancel: CancellationToken,
    busy_timeout: Duration,
}

impl WriteScope<'_> {
    pub(super) fn checkpoint(&self, stage: &str) -> Result<()> {
        checkpoint(&self.cancel, stage)
    }

    /// Runs `f` and maps lock contention inside it.
    pub(super) fn run<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        f(&self.tx).map_err(|e| storage_error(e, self.busy_timeout))
    }

    pub(super) fn commit(self) -> Result<()> {
        self.checkpoint("commit")?;
        let busy_timeout = self.busy_timeout;
        self.tx.commit().map_err(|e| storage_error(e, busy_timeout))
    }
}

impl Deref for WriteScope<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}

/// A read snapshot; reads inside it see one consistent state.
pub(super) struct ReadScope<'conn> {
    tx: Transaction<'conn>,
}

impl Deref for ReadScope<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}

impl Database {
    /// Begins an `IMMEDIATE` write transaction.
    ///
    /// Waits up to the configured busy timeout for the write lock, giving
    /// up early with [`Error::Cancelled`] once the token is cancelled.
    pub(super) fn begin_write(&mut self) -> Result<WriteScope<'_>> {
        let cancel = self.cancel.clone();
        let busy_timeout = self.config.busy_timeout;
        checkpoint(&cancel, "begin")?;

        let conn = &self.conn;
        let acquired = acquire_write_lock(conn, &cancel, busy_timeout);
        conn.busy_timeout(busy_timeout)?;
        let tx = acquired?;

        let scope = WriteScope {
            tx,
            cancel,
            busy_timeout,
        };
        scope.checkpoint("lock acquired")?;
        Ok(scope)
    }

    /// Begins a deferred read transaction.
    pub(super) fn begin_read(&self) -> Result<ReadScope<'_>> {
        checkpoint(&self.cancel, "begin")?;
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| storage_error(e, self.config.busy_timeout))?;
        Ok(ReadScope { tx })
    }
}
