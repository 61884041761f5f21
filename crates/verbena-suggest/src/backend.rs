//! The similarity backend trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the index error type.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Error type for similarity backend operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The backend could not be reached.
    #[error("Similarity backend unreachable: {0}")]
    Unreachable(String),

    /// The backend returned an unusable response.
    #[error("Similarity backend error: {0}")]
    Backend(String),
}

/// One scored item from a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredItem {
    /// The indexed text.
    pub item: String,
    /// Similarity score in `[0, 1]`, higher is closer.
    pub score: f32,
}

/// Interface to an external semantic-similarity index.
///
/// Implementations return up to `top_k` items nearest to `text`, most
/// similar first; ties keep the backend's insertion order so rankings are
/// reproducible against a fixed index.
#[async_trait]
pub trait SimilarityBackend: Send + Sync {
    /// Query the index for items near `text`.
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ScoredItem>>;
}
