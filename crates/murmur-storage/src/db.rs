//! Database connection management.
//!
//! A single rusqlite `Connection` behind a `Mutex`, configured for WAL and
//! migrated on open.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use murmur_core::error::MurmurError;

use crate::migrations;

/// Thread-safe SQLite database wrapper.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database at `path` and run pending migrations.
    pub fn new(path: &Path) -> Result<Self, MurmurError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)
            .map_err(|e| MurmurError::Storage(format!("Failed to open database: {}", e)))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
        .map_err(|e| MurmurError::Storage(format!("Failed to set pragmas: {}", e)))?;

        info!(path = %path.display(), "Database opened");
        Self::migrated(conn)
    }

    /// Open an in-memory database (for tests and throwaway servers).
    pub fn in_memory() -> Result<Self, MurmurError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| MurmurError::Storage(format!("Failed to open in-memory db: {}", e)))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| MurmurError::Storage(format!("Failed to set pragmas: {}", e)))?;

        Self::migrated(conn)
    }

    fn migrated(conn: Connection) -> Result<Self, MurmurError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.with_conn(migrations::run_migrations)?;
        Ok(db)
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, MurmurError>
    where
        F: FnOnce(&Connection) -> Result<T, MurmurError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| MurmurError::Storage(format!("Database lock poisoned: {}", e)))?;
        f(&conn)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish()
    }
}
