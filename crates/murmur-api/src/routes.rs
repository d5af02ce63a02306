//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use murmur_core::config::MurmurConfig;
use murmur_core::error::MurmurError;

use crate::handlers;
use crate::state::AppState;

/// Origins allowed by CORS: the configured list, or the local server itself.
fn allowed_origins(config: &MurmurConfig) -> Vec<HeaderValue> {
    let origins = if config.server.allowed_origins.is_empty() {
        let port = config.server.port;
        vec![
            format!("http://127.0.0.1:{}", port),
            format!("http://localhost:{}", port),
        ]
    } else {
        config.server.allowed_origins.clone()
    };

    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(&state.config)))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Entry bodies are JSON-wrapped content, so allow some headroom.
    let body_limit = state.config.journal.max_entry_bytes.saturating_mul(2).max(16 * 1024);

    let public_routes = Router::new().route("/health", get(handlers::health));

    let protected_routes = Router::new()
        .route(
            "/journal/entries",
            get(handlers::list_entries).post(handlers::create_entry),
        )
        .route(
            "/journal/entries/{id}",
            get(handlers::get_entry).put(handlers::update_entry),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ));

    public_routes
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind to the configured address and serve until the process exits.
pub async fn start_server(state: AppState) -> Result<(), MurmurError> {
    let addr = format!(
        "{}:{}",
        state.config.server.bind_address, state.config.server.port
    );
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MurmurError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "API server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| MurmurError::Api(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origins_follow_port() {
        let mut config = MurmurConfig::default();
        config.server.port = 4000;
        let origins = allowed_origins(&config);
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://127.0.0.1:4000");
    }

    #[test]
    fn test_configured_origins_skip_invalid() {
        let mut config = MurmurConfig::default();
        config.server.allowed_origins = vec![
            "https://journal.example.com".to_string(),
            "bad\norigin".to_string(),
        ];
        let origins = allowed_origins(&config);
        assert_eq!(origins, vec![HeaderValue::from_static("https://journal.example.com")]);
    }
}
