//! Murmur API crate - axum HTTP server for journal entries.
//!
//! Serves the entry endpoints behind bearer-token authentication, plus a
//! public health check.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
