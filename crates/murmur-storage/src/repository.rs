//! Repository implementations for SQLite-backed persistence.
//!
//! `UserRepository` stores accounts and their bearer tokens;
//! `JournalRepository` stores journal entries. Both operate on the shared
//! `Database` using raw SQL.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use murmur_core::error::MurmurError;
use murmur_core::types::{JournalEntry, User};

use crate::db::Database;

fn storage_err(e: rusqlite::Error) -> MurmurError {
    MurmurError::Storage(e.to_string())
}

/// Repository for user accounts.
pub struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a user together with the bearer token that authenticates them.
    pub fn create(&self, user: &User, token: &str) -> Result<(), MurmurError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, token, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    user.id.to_string(),
                    user.name,
                    token,
                    user.created_at.timestamp_millis(),
                ],
            )
            .map_err(|e| MurmurError::Storage(format!("Failed to create user: {}", e)))?;
            Ok(())
        })
    }

    /// Resolve a bearer token to its user.
    pub fn find_by_token(&self, token: &str) -> Result<Option<User>, MurmurError> {
        self.find_one(
            "SELECT id, name, created_at FROM users WHERE token = ?1",
            token,
        )
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<User>, MurmurError> {
        self.find_one("SELECT id, name, created_at FROM users WHERE name = ?1", name)
    }

    fn find_one(&self, sql: &str, key: &str) -> Result<Option<User>, MurmurError> {
        self.db.with_conn(|conn| {
            let found = conn
                .query_row(sql, rusqlite::params![key], |row| Ok(row_to_user(row)))
                .optional()
                .map_err(storage_err)?;
            found.transpose()
        })
    }

    pub fn count(&self) -> Result<u64, MurmurError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
                .map_err(storage_err)?;
            Ok(count as u64)
        })
    }
}

/// Repository for journal entries.
pub struct JournalRepository {
    db: Arc<Database>,
}

impl JournalRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new entry.
    pub fn create(&self, entry: &JournalEntry) -> Result<(), MurmurError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO journal_entries (id, content, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.content,
                    entry.user_id.to_string(),
                    entry.created_at.timestamp_millis(),
                    entry.updated_at.timestamp_millis(),
                ],
            )
            .map_err(|e| MurmurError::Storage(format!("Failed to save journal entry: {}", e)))?;
            Ok(())
        })
    }

    pub fn find_by_id(&self, id: Uuid) -> Result<Option<JournalEntry>, MurmurError> {
        self.db.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT id, content, user_id, created_at, updated_at
                     FROM journal_entries WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                    |row| Ok(row_to_entry(row)),
                )
                .optional()
                .map_err(storage_err)?;
            found.transpose()
        })
    }

    /// Entries of one user, newest first.
    pub fn list_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<JournalEntry>, MurmurError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, content, user_id, created_at, updated_at
                     FROM journal_entries
                     WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?2",
                )
                .map_err(storage_err)?;

            let rows = stmt
                .query_map(rusqlite::params![user_id.to_string(), limit], |row| {
                    Ok(row_to_entry(row))
                })
                .map_err(storage_err)?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row.map_err(storage_err)??);
            }
            Ok(entries)
        })
    }

    /// Replace an entry's content and bump `updated_at`.
    ///
    /// Returns the updated entry, or `EntryNotFound` if no row matched.
    pub fn update_content(&self, id: Uuid, content: &str) -> Result<JournalEntry, MurmurError> {
        let now = Utc::now();
        let changed = self.db.with_conn(|conn| {
            conn.execute(
                "UPDATE journal_entries SET content = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![content, now.timestamp_millis(), id.to_string()],
            )
            .map_err(|e| MurmurError::Storage(format!("Failed to update journal entry: {}", e)))
        })?;

        if changed == 0 {
            return Err(MurmurError::EntryNotFound { id: id.to_string() });
        }
        self.find_by_id(id)?
            .ok_or_else(|| MurmurError::EntryNotFound { id: id.to_string() })
    }

    pub fn count_for_user(&self, user_id: Uuid) -> Result<u64, MurmurError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM journal_entries WHERE user_id = ?1",
                    rusqlite::params![user_id.to_string()],
                    |row| row.get(0),
                )
                .map_err(storage_err)?;
            Ok(count as u64)
        })
    }
}

// =============================================================================
// Row mapping
// =============================================================================

fn parse_uuid(s: &str) -> Result<Uuid, MurmurError> {
    Uuid::parse_str(s).map_err(|e| MurmurError::Storage(format!("Invalid UUID: {}", e)))
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, MurmurError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| MurmurError::Storage(format!("Invalid timestamp: {}", ms)))
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, MurmurError> {
    let id: String = row.get(0).map_err(storage_err)?;
    let name: String = row.get(1).map_err(storage_err)?;
    let created_at: i64 = row.get(2).map_err(storage_err)?;

    Ok(User {
        id: parse_uuid(&id)?,
        name,
        created_at: from_millis(created_at)?,
    })
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<JournalEntry, MurmurError> {
    let id: String = row.get(0).map_err(storage_err)?;
    let content: String = row.get(1).map_err(storage_err)?;
    let user_id: String = row.get(2).map_err(storage_err)?;
    let created_at: i64 = row.get(3).map_err(storage_err)?;
    let updated_at: i64 = row.get(4).map_err(storage_err)?;

    Ok(JournalEntry {
        id: parse_uuid(&id)?,
        content,
        user_id: parse_uuid(&user_id)?,
        created_at: from_millis(created_at)?,
        updated_at: from_millis(updated_at)?,
    })
}
