//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::Instant;

use murmur_core::config::MurmurConfig;
use murmur_storage::Database;

/// Shared application state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MurmurConfig>,
    pub database: Arc<Database>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: MurmurConfig, database: Database) -> Self {
        Self {
            config: Arc::new(config),
            database: Arc::new(database),
            start_time: Instant::now(),
        }
    }
}
