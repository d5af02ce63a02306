//! API error types and JSON error response formatting.
//!
//! Every failure is rendered as `{error, message}` with a machine-readable
//! code and the matching HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use murmur_core::error::MurmurError;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 - missing or invalid input.
    BadRequest(String),
    /// 401 - no valid credentials, or the resource belongs to someone else.
    Unauthorized(String),
    /// 404 - resource does not exist.
    NotFound(String),
    /// 500 - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<MurmurError> for ApiError {
    fn from(err: MurmurError) -> Self {
        match err {
            MurmurError::InvalidContent(msg) => ApiError::BadRequest(msg),
            MurmurError::EntryNotFound { .. } => ApiError::NotFound("Entry not found".to_string()),
            MurmurError::NotOwner { .. } => ApiError::Unauthorized("Unauthorized".to_string()),
            MurmurError::Auth(msg) => ApiError::Unauthorized(msg),
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_status() {
        let cases = [
            (
                MurmurError::InvalidContent("Content is required".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                MurmurError::EntryNotFound { id: "x".into() },
                StatusCode::NOT_FOUND,
            ),
            (
                MurmurError::NotOwner { id: "x".into() },
                StatusCode::UNAUTHORIZED,
            ),
            (
                MurmurError::Storage("disk I/O error".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let resp = ApiError::from(err).into_response();
            assert_eq!(resp.status(), status);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        match ApiError::from(MurmurError::Storage("secret path".into())) {
            ApiError::Internal(msg) => assert_eq!(msg, "Internal server error"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
