//! Error types for the cache server
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache server.
///
/// Missing keys are not an engine error; the engine reports them as an
/// absent value and only the HTTP layer turns that into `NotFound`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Misconfigured limits or malformed request data
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Key not found in cache (absent or expired)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Payload exceeds a configured size bound
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Internal server error; indicates a bug
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::ResourceExhausted(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            CacheError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache server.
pub type Result<T> = std::result::Result<T, CacheError>;
