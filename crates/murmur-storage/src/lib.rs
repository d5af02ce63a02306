//! Murmur Storage crate - SQLite persistence for users and journal entries.
//!
//! Provides a WAL-mode SQLite database with versioned migrations and the
//! repositories backing the entry endpoints and bearer-token authentication.

pub mod db;
pub mod migrations;
pub mod repository;

pub use db::Database;
pub use repository::{JournalRepository, UserRepository};
