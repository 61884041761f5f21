//! Error types for the reasoning-engine crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias using the LLM error type.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Error type for reasoning-engine operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Backend/API error from the provider.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Network/connectivity error (retryable).
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out (retryable).
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Configuration error (API key missing, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded (retryable with backoff).
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Authentication failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider returned structurally invalid output (e.g. a tool call
    /// whose arguments are not valid JSON).
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),
}

impl LlmError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit(_)
        )
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            LlmError::Network(format!("Connection failed: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Serialization(err.to_string())
    }
}

/// Check if an error is retryable.
///
/// Network, timeout, and rate limit errors are retryable. Config,
/// serialization, and malformed-output errors should not be retried.
pub fn is_retryable(error: &LlmError) -> bool {
    error.is_retryable()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&LlmError::Network("timeout".to_string())));
        assert!(is_retryable(&LlmError::RateLimit("slow down".to_string())));
        assert!(is_retryable(&LlmError::Timeout(Duration::from_secs(30))));
        assert!(!is_retryable(&LlmError::Config("bad config".to_string())));
        assert!(!is_retryable(&LlmError::Auth("unauthorized".to_string())));
        assert!(!is_retryable(&LlmError::Backend("server error".to_string())));
        assert!(!is_retryable(&LlmError::MalformedOutput(
            "bad tool arguments".to_string()
        )));
    }

    #[test]
    fn test_error_display() {
        let err = LlmError::MalformedOutput("unparseable arguments".to_string());
        assert!(err.to_string().contains("Malformed model output"));
        assert!(err.to_string().contains("unparseable arguments"));
    }
}
