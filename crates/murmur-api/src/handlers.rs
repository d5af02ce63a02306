//! Route handler functions for all API endpoints.
//!
//! Entry handlers act on behalf of the authenticated user through a
//! `RepositoryEntryService`, which owns validation and ownership checks.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use murmur_core::types::JournalEntry;
use murmur_journal::{EntryService, RepositoryEntryService};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

/// Body of POST and PUT on entries.
#[derive(Debug, Deserialize)]
pub struct EntryRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

fn entry_service(state: &AppState, user: &AuthUser) -> RepositoryEntryService {
    RepositoryEntryService::new(
        Arc::clone(&state.database),
        user.0.id,
        &state.config.journal,
    )
}

/// Pull `content` out of a JSON body. Missing, unparsable and empty all
/// count as "Content is required".
fn required_content(
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<String, ApiError> {
    let content = match payload {
        Ok(Json(body)) => body.content,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected entry body");
            None
        }
    };
    content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Content is required".to_string()))
}

/// Malformed ids cannot name an entry.
fn parse_entry_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound("Entry not found".to_string()))
}

// =============================================================================
// Public
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// =============================================================================
// Journal entries
// =============================================================================

/// GET /journal/entries - the caller's entries, newest first.
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<JournalEntry>>, ApiError> {
    let entries = entry_service(&state, &user).list().await?;
    Ok(Json(entries))
}

/// POST /journal/entries
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JournalEntry>), ApiError> {
    let content = required_content(payload)?;
    let entry = entry_service(&state, &user).create(&content).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /journal/entries/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<JournalEntry>, ApiError> {
    let id = parse_entry_id(&id)?;
    let entry = entry_service(&state, &user).get(id).await?;
    Ok(Json(entry))
}

/// PUT /journal/entries/{id}
///
/// Checks run in order: content present (400), entry exists (404), caller
/// owns it (401).
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<Json<JournalEntry>, ApiError> {
    let content = required_content(payload)?;
    let id = parse_entry_id(&id)?;
    let entry = entry_service(&state, &user).update(id, &content).await?;
    Ok(Json(entry))
}
