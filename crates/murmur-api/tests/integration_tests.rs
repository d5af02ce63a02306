//! Integration tests for the Murmur API.
//!
//! Every test builds its own router over an in-memory database with two
//! registered users.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use murmur_api::auth::register_user;
use murmur_api::create_router;
use murmur_api::handlers::HealthResponse;
use murmur_api::state::AppState;
use murmur_core::config::MurmurConfig;
use murmur_core::types::JournalEntry;
use murmur_storage::Database;

// =============================================================================
// Helpers
// =============================================================================

struct TestApp {
    router: axum::Router,
    ada: String,
    grace: String,
}

fn make_app() -> TestApp {
    let state = AppState::new(MurmurConfig::default(), Database::in_memory().unwrap());
    let (_, ada) = register_user(Arc::clone(&state.database), "ada").unwrap();
    let (_, grace) = register_user(Arc::clone(&state.database), "grace").unwrap();
    TestApp {
        router: create_router(state),
        ada,
        grace,
    }
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn authed_json(method: &str, uri: &str, token: &str, json: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

/// POST an entry as `token` and return it.
async fn create(app: &TestApp, token: &str, content: &str) -> JournalEntry {
    let body = serde_json::json!({ "content": content }).to_string();
    let resp = app
        .router
        .clone()
        .oneshot(authed_json("POST", "/journal/entries", token, &body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn test_health_no_auth_required() {
    let app = make_app();
    let resp = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_health_uses_camel_case() {
    let app = make_app();
    let resp = app
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_json(resp).await;
    assert!(json.get("uptimeSecs").is_some());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_returns_401() {
    let app = make_app();
    let resp = app
        .router
        .oneshot(Request::get("/journal/entries").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(resp).await;
    assert_eq!(json["error"], "unauthorized");
    assert!(json["message"].as_str().unwrap().contains("Missing"));
}

#[tokio::test]
async fn test_invalid_token_returns_401() {
    let app = make_app();
    let resp = app
        .router
        .oneshot(authed_get("/journal/entries", "not-a-real-token"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_returns_401() {
    let app = make_app();
    let resp = app
        .router
        .oneshot(
            Request::get("/journal/entries")
                .header("authorization", format!("Basic {}", app.ada))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Create / list
// =============================================================================

#[tokio::test]
async fn test_create_entry_returns_201() {
    let app = make_app();
    let entry = create(&app, &app.ada, "Morning pages").await;
    assert_eq!(entry.content, "Morning pages");
}

#[tokio::test]
async fn test_create_entry_json_shape() {
    let app = make_app();
    let resp = app
        .router
        .clone()
        .oneshot(authed_json(
            "POST",
            "/journal/entries",
            &app.ada,
            r#"{"content":"shape"}"#,
        ))
        .await
        .unwrap();
    let json = body_json(resp).await;
    for key in ["id", "content", "userId", "createdAt", "updatedAt"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
}

#[tokio::test]
async fn test_create_requires_content() {
    let app = make_app();
    for body in [r#"{}"#, r#"{"content":""}"#, r#"{"content":"   "}"#, "not json"] {
        let resp = app
            .router
            .clone()
            .oneshot(authed_json("POST", "/journal/entries", &app.ada, body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body {}", body);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_list_is_per_user_and_newest_first() {
    let app = make_app();
    create(&app, &app.ada, "first").await;
    create(&app, &app.ada, "second").await;
    create(&app, &app.grace, "someone else").await;

    let resp = app
        .router
        .clone()
        .oneshot(authed_get("/journal/entries", &app.ada))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let entries: Vec<JournalEntry> = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    let contents: Vec<&str> = entries.iter().map(|e| e.content.as_str()).collect();
    assert_eq!(contents, vec!["second", "first"]);
}

// =============================================================================
// Get / update
// =============================================================================

#[tokio::test]
async fn test_get_entry() {
    let app = make_app();
    let entry = create(&app, &app.ada, "read me").await;

    let resp = app
        .router
        .clone()
        .oneshot(authed_get(&format!("/journal/entries/{}", entry.id), &app.ada))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: JournalEntry = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(fetched.id, entry.id);
}

#[tokio::test]
async fn test_get_missing_or_malformed_is_404() {
    let app = make_app();
    for uri in [
        format!("/journal/entries/{}", Uuid::new_v4()),
        "/journal/entries/not-a-uuid".to_string(),
    ] {
        let resp = app
            .router
            .clone()
            .oneshot(authed_get(&uri, &app.ada))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_get_other_users_entry_is_401() {
    let app = make_app();
    let entry = create(&app, &app.ada, "private").await;

    let resp = app
        .router
        .clone()
        .oneshot(authed_get(&format!("/journal/entries/{}", entry.id), &app.grace))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_entry() {
    let app = make_app();
    let entry = create(&app, &app.ada, "before").await;

    let resp = app
        .router
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/journal/entries/{}", entry.id),
            &app.ada,
            r#"{"content":"after"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: JournalEntry = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(updated.id, entry.id);
    assert_eq!(updated.content, "after");
    assert!(updated.updated_at >= entry.updated_at);
}

#[tokio::test]
async fn test_update_without_content_is_400() {
    let app = make_app();
    let entry = create(&app, &app.ada, "keep").await;

    let resp = app
        .router
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/journal/entries/{}", entry.id),
            &app.ada,
            r#"{"content":""}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "Content is required");
}

#[tokio::test]
async fn test_update_checks_content_before_existence() {
    let app = make_app();
    let resp = app
        .router
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/journal/entries/{}", Uuid::new_v4()),
            &app.ada,
            r#"{}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_entry_is_404() {
    let app = make_app();
    let resp = app
        .router
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/journal/entries/{}", Uuid::new_v4()),
            &app.ada,
            r#"{"content":"x"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["message"], "Entry not found");
}

#[tokio::test]
async fn test_update_other_users_entry_is_401() {
    let app = make_app();
    let entry = create(&app, &app.ada, "mine").await;

    let resp = app
        .router
        .clone()
        .oneshot(authed_json(
            "PUT",
            &format!("/journal/entries/{}", entry.id),
            &app.grace,
            r#"{"content":"hijack"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Unchanged for the owner.
    let resp = app
        .router
        .clone()
        .oneshot(authed_get(&format!("/journal/entries/{}", entry.id), &app.ada))
        .await
        .unwrap();
    let fetched: JournalEntry = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(fetched.content, "mine");
}
