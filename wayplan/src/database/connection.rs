//! Database connection management.
//!
//! This module provides the main database connection type with proper
//! initialization and PRAGMA settings for optimal `SQLite` configuration.

use std::panic::AssertUnwindSafe;

use rusqlite::{Connection, OpenFlags, TransactionBehavior};

use crate::cancel::CancellationToken;
use crate::error::Result;

use super::config::DatabaseConfig;

/// Virtual machine instructions between cancellation checks of a running
/// statement.
const INTERRUPT_CHECK_OPS: i32 = 1000;

/// A database connection wrapper with configuration.
///
/// Each `Database` owns one `SQLite` connection. Open one per thread; the
/// store serializes writers across connections and processes.
///
/// The connection also holds the [`CancellationToken`] that every repository
/// call checks while it runs.
///
/// # Examples
///
/// ```no_run
/// use wayplan::database::{Database, DatabaseConfig};
///
/// let config = DatabaseConfig::new("/tmp/wayplan.db");
/// let db = Database::open(config).unwrap();
/// ```
#[derive(Debug)]
pub struct Database {
    pub(super) conn: Connection,
    pub(super) config: DatabaseConfig,
    pub(super) cancel: CancellationToken,
}

impl Database {
    /// Opens a database connection with the given configuration.
    ///
    /// This function will:
    /// - Create the parent directory if `auto_create` is enabled
    /// - Open the database with appropriate flags
    /// - Set WAL mode, foreign keys and the busy timeout
    /// - Initialize or verify the database schema
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database file cannot be opened
    /// - The parent directory cannot be created
    /// - PRAGMA settings cannot be applied
    /// - Schema initialization or verification fails
    pub fn open(config: DatabaseConfig) -> Result<Self> {
        if config.auto_create && !config.path.exists() {
            if let Some(parent) = config.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else if config.auto_create {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };

        let mut conn = Connection::open_with_flags(&config.path, flags)?;

        // busy_timeout first so the pragmas below wait out concurrent openers
        conn.busy_timeout(config.busy_timeout)?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        if config.read_only {
            super::migrations::check_schema_compatibility(&conn)?;
        } else {
            // PRAGMA journal_mode returns a row, so query_row rather than execute
            let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            conn.execute_batch("PRAGMA synchronous = NORMAL")?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            super::migrations::check_schema_compatibility(&tx)?;
            tx.commit()?;
        }

        log::debug!("opened database at {}", config.path.display());

        let db = Self {
            conn,
            config,
            cancel: CancellationToken::new(),
        };
        db.install_interrupt();
        Ok(db)
    }

    /// Makes running statements fail with `SQLITE_INTERRUPT` once the
    /// current token is cancelled.
    fn install_interrupt(&self) {
        let token = AssertUnwindSafe(self.cancel.clone());
        self.conn
            .progress_handler(INTERRUPT_CHECK_OPS, Some(move || token.is_cancelled()));
    }

    /// Returns a reference to the underlying `SQLite` connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns a mutable reference to the underlying `SQLite` connection.
    ///
    /// Writes made through it bypass version checks and order maintenance.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Returns the configuration this database was opened with.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Returns a handle to this connection's cancellation token.
    ///
    /// Cancelling the handle, from any thread, makes the in-flight and all
    /// later repository calls on this connection return
    /// [`Error::Cancelled`](crate::Error::Cancelled) until
    /// [`reset_cancellation`](Self::reset_cancellation) is called.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wayplan::database::{Database, DatabaseConfig};
    ///
    /// let db = Database::open(DatabaseConfig::new("/tmp/wayplan.db")).unwrap();
    /// let token = db.cancellation_token();
    /// std::thread::spawn(move || token.cancel());
    /// ```
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Installs a fresh, uncancelled token.
    ///
    /// Handles obtained earlier no longer affect this connection.
    pub fn reset_cancellation(&mut self) {
        self.cancel = CancellationToken::new();
        self.install_interrupt();
    }
}
