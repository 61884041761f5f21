//! Server error type and HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias using the server error type.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error type for HTTP handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body was unusable.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Internal(_) => {
                // Detail goes to the log, not to the client.
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
