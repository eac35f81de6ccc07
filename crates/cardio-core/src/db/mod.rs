//! Database layer for the clinic record store.

mod appointments;
mod ids;
mod patients;
mod records;
mod schema;
mod tables;

pub use ids::*;
pub use schema::*;
pub use tables::*;

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// How long a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("No doctors available to assign")]
    NoDoctors,

    #[error("No free identifier in {table} after {attempts} attempts")]
    IdSpaceExhausted { table: &'static str, attempts: usize },
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
///
/// One `Database` is one SQLite connection; dropping it closes the
/// connection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating the file and schema if needed.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Open a connection to an already initialized database.
    ///
    /// Fails with `SQLITE_CANTOPEN` if the file does not exist; only
    /// [`Database::open`] creates it.
    pub fn connect<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> DbResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(busy_timeout)?;
        Ok(Self { conn })
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
