//! Error types for the session store.

use thiserror::Error;

/// Result type alias using the session error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for session store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced session id was never created (or has been evicted).
    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownSession("ws-42".to_string());
        assert!(err.to_string().contains("Unknown session"));
        assert!(err.to_string().contains("ws-42"));
    }
}
