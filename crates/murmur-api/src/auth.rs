//! API authentication via bearer tokens.
//!
//! Each user owns one random token. `require_auth` resolves the
//! `Authorization: Bearer <token>` header to a user and makes it available
//! to handlers as an `AuthUser` extension.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;

use murmur_core::error::MurmurError;
use murmur_core::types::User;
use murmur_storage::{Database, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// The user a request was authenticated as.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Generate a random 32-character hex token.
pub fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    hex::encode(bytes)
}

/// Create a user with a fresh token. Returns the user and the token.
pub fn register_user(db: Arc<Database>, name: &str) -> Result<(User, String), MurmurError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MurmurError::Auth("User name must not be empty".to_string()));
    }

    let users = UserRepository::new(db);
    if users.find_by_name(name)?.is_some() {
        return Err(MurmurError::Auth(format!("User '{}' already exists", name)));
    }

    let user = User::new(name);
    let token = generate_token();
    users.create(&user, &token)?;
    tracing::info!(user_id = %user.id, name = %user.name, "User registered");
    Ok((user, token))
}

/// Middleware that validates bearer tokens against the users table.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = match req.headers().get("authorization") {
        None => return unauthorized("Missing Authorization header"),
        Some(value) => match value.to_str() {
            Ok(s) => s.strip_prefix("Bearer ").map(str::trim).map(str::to_string),
            Err(_) => return unauthorized("Invalid Authorization header encoding"),
        },
    };
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return unauthorized("Invalid bearer token");
    };

    match UserRepository::new(Arc::clone(&state.database)).find_by_token(&token) {
        Ok(Some(user)) => {
            req.extensions_mut().insert(AuthUser(user));
            next.run(req).await
        }
        Ok(None) => unauthorized("Invalid bearer token"),
        Err(e) => ApiError::from(e).into_response(),
    }
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}
