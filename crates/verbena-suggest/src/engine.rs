//! The suggestion engine.

use std::sync::Arc;

use crate::backend::SimilarityBackend;

/// Configuration for suggestion ranking.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    /// Maximum suggestions returned to the caller.
    pub limit: usize,
    /// How many candidates to fetch from the backend before filtering.
    pub candidate_pool: usize,
    /// Minimum similarity score a candidate must reach.
    pub min_score: f32,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            limit: 5,
            candidate_pool: 15,
            min_score: 0.35,
        }
    }
}

impl SuggestConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the suggestion limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the candidate pool size.
    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool;
        self
    }

    /// Set the minimum score threshold.
    pub fn with_min_score(mut self, score: f32) -> Self {
        self.min_score = score;
        self
    }
}

/// Maps a conversation topic to ranked follow-up questions.
///
/// Failure-proof by design: backend errors and empty result sets both
/// degrade to an empty list. For a fixed topic and a fixed index state the
/// ranking is stable: candidates are stable-sorted by score descending, so
/// ties keep the backend's insertion order.
pub struct SuggestionEngine {
    backend: Arc<dyn SimilarityBackend>,
    config: SuggestConfig,
}

impl SuggestionEngine {
    /// Create a new engine over the given backend.
    pub fn new(backend: Arc<dyn SimilarityBackend>, config: SuggestConfig) -> Self {
        Self { backend, config }
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &SuggestConfig {
        &self.config
    }

    /// Return ranked follow-up questions near `topic`.
    ///
    /// Never errors: an unreachable backend or a pool with nothing above the
    /// score threshold yields an empty list.
    pub async fn suggest(&self, topic: &str) -> Vec<String> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Vec::new();
        }

        let candidates = match self.backend.query(topic, self.config.candidate_pool).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion backend failed, degrading to empty list");
                return Vec::new();
            }
        };

        let mut kept: Vec<_> = candidates
            .into_iter()
            .filter(|c| c.score >= self.config.min_score)
            .collect();
        kept.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let mut suggestions = Vec::with_capacity(self.config.limit);
        for candidate in kept {
            if suggestions.contains(&candidate.item) {
                continue;
            }
            suggestions.push(candidate.item);
            if suggestions.len() == self.config.limit {
                break;
            }
        }

        tracing::debug!(
            topic = %topic,
            count = suggestions.len(),
            "Suggestions computed"
        );

        suggestions
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{IndexError, Result, ScoredItem, SimilarityBackend};
    use async_trait::async_trait;

    struct FixedBackend(Vec<ScoredItem>);

    #[async_trait]
    impl SimilarityBackend for FixedBackend {
        async fn query(&self, _text: &str, top_k: usize) -> Result<Vec<ScoredItem>> {
            Ok(self.0.iter().take(top_k).cloned().collect())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl SimilarityBackend for FailingBackend {
        async fn query(&self, _text: &str, _top_k: usize) -> Result<Vec<ScoredItem>> {
            Err(IndexError::Unreachable("connection refused".to_string()))
        }
    }

    fn item(text: &str, score: f32) -> ScoredItem {
        ScoredItem {
            item: text.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_ranked_by_score_with_stable_ties() {
        let backend = FixedBackend(vec![
            item("first tie", 0.5),
            item("top", 0.9),
            item("second tie", 0.5),
        ]);
        let engine = SuggestionEngine::new(Arc::new(backend), SuggestConfig::default());

        let suggestions = engine.suggest("haircut").await;
        assert_eq!(suggestions, vec!["top", "first tie", "second tie"]);
    }

    #[tokio::test]
    async fn test_threshold_filters_weak_matches() {
        let backend = FixedBackend(vec![item("strong", 0.8), item("weak", 0.1)]);
        let engine = SuggestionEngine::new(Arc::new(backend), SuggestConfig::default());

        let suggestions = engine.suggest("haircut").await;
        assert_eq!(suggestions, vec!["strong"]);
    }

    #[tokio::test]
    async fn test_nothing_above_threshold_yields_empty_list() {
        let backend = FixedBackend(vec![item("weak", 0.1), item("weaker", 0.05)]);
        let engine = SuggestionEngine::new(Arc::new(backend), SuggestConfig::default());

        assert!(engine.suggest("haircut").await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades_to_empty_list() {
        let engine = SuggestionEngine::new(Arc::new(FailingBackend), SuggestConfig::default());
        assert!(engine.suggest("haircut").await.is_empty());
    }

    #[tokio::test]
    async fn test_limit_and_dedup() {
        let backend = FixedBackend(vec![
            item("a", 0.9),
            item("a", 0.8),
            item("b", 0.7),
            item("c", 0.6),
            item("d", 0.5),
            item("e", 0.45),
            item("f", 0.4),
        ]);
        let engine = SuggestionEngine::new(
            Arc::new(backend),
            SuggestConfig::default().with_limit(5),
        );

        let suggestions = engine.suggest("haircut").await;
        assert_eq!(suggestions, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_blank_topic_short_circuits() {
        let engine = SuggestionEngine::new(Arc::new(FailingBackend), SuggestConfig::default());
        assert!(engine.suggest("   ").await.is_empty());
    }
}
