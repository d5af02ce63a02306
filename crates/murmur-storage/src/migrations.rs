//! Database schema migrations.
//!
//! Versions are recorded in `schema_migrations`; each pending version is
//! applied in order on open.

use rusqlite::Connection;
use tracing::info;

use murmur_core::error::MurmurError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), MurmurError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| MurmurError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| MurmurError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: initial_schema");
    }

    Ok(())
}

/// Version 1: users and journal entries. Timestamps are Unix milliseconds.
fn apply_v1(conn: &Connection) -> Result<(), MurmurError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL UNIQUE,
            token       TEXT NOT NULL UNIQUE,
            created_at  INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS journal_entries (
            id          TEXT PRIMARY KEY NOT NULL,
            content     TEXT NOT NULL,
            user_id     TEXT NOT NULL,
            created_at  INTEGER NOT NULL,
            updated_at  INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_journal_entries_user
            ON journal_entries (user_id, created_at DESC);

        INSERT INTO schema_migrations (version, name) VALUES (1, 'initial_schema');
        ",
    )
    .map_err(|e| MurmurError::Storage(format!("Migration v1 failed: {}", e)))?;

    Ok(())
}
