//! In-memory similarity index.
//!
//! Token-overlap scoring over an insertion-ordered corpus. Not a real vector
//! index: it stands in for the external semantic backend in tests, demos,
//! and offline runs, and its scoring is fully deterministic.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::backend::{Result, ScoredItem, SimilarityBackend};

/// An insertion-ordered corpus with token-overlap similarity scoring.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    items: Vec<String>,
}

impl InMemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index seeded with the default follow-up question corpus.
    pub fn with_default_questions() -> Self {
        let mut index = Self::new();
        for question in DEFAULT_QUESTIONS {
            index.insert(*question);
        }
        index
    }

    /// Add an item to the corpus. Insertion order is the tiebreak order.
    pub fn insert(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Number of indexed items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Lowercased alphanumeric tokens of at least two characters.
fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(|t| t.to_string())
        .collect()
}

/// Jaccard-style overlap between query tokens and item tokens.
fn overlap_score(query: &HashSet<String>, item: &HashSet<String>) -> f32 {
    if query.is_empty() || item.is_empty() {
        return 0.0;
    }
    let shared = query.intersection(item).count();
    if shared == 0 {
        return 0.0;
    }
    let union = query.union(item).count();
    // Blend plain overlap with containment so short queries still rank well
    // against longer indexed questions.
    let jaccard = shared as f32 / union as f32;
    let containment = shared as f32 / query.len() as f32;
    (jaccard + containment) / 2.0
}

#[async_trait]
impl SimilarityBackend for InMemoryIndex {
    async fn query(&self, text: &str, top_k: usize) -> Result<Vec<ScoredItem>> {
        let query = tokens(text);

        let mut scored: Vec<ScoredItem> = self
            .items
            .iter()
            .map(|item| ScoredItem {
                item: item.clone(),
                score: overlap_score(&query, &tokens(item)),
            })
            .filter(|s| s.score > 0.0)
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Follow-up questions seeded into every default index.
const DEFAULT_QUESTIONS: &[&str] = &[
    "What time slots are open for a haircut tomorrow?",
    "How much does a haircut cost?",
    "Can I book a haircut and coloring together?",
    "What hair treatments do you recommend for damaged hair?",
    "Do you have any openings for a facial this week?",
    "What is included in the spa pedicure?",
    "How long does a full-head coloring take?",
    "Can I see my existing booking?",
    "How do I cancel or change my appointment?",
    "Which branch is closest to the city center?",
    "What are your opening hours on weekends?",
    "Do you offer bridal styling packages?",
    "What should I do to prepare for a keratin treatment?",
    "Can you suggest a style for thin hair?",
    "What skincare routine helps with acne?",
];

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_ranks_closest_first() {
        let mut index = InMemoryIndex::new();
        index.insert("What time slots are open for a haircut tomorrow?");
        index.insert("What is included in the spa pedicure?");

        let results = index.query("haircut tomorrow", 10).await.unwrap();
        assert_eq!(
            results[0].item,
            "What time slots are open for a haircut tomorrow?"
        );
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_query_is_deterministic() {
        let index = InMemoryIndex::with_default_questions();
        let a = index.query("haircut price", 5).await.unwrap();
        let b = index.query("haircut price", 5).await.unwrap();

        let items_a: Vec<_> = a.iter().map(|s| &s.item).collect();
        let items_b: Vec<_> = b.iter().map(|s| &s.item).collect();
        assert_eq!(items_a, items_b);
    }

    #[tokio::test]
    async fn test_no_overlap_yields_nothing() {
        let index = InMemoryIndex::with_default_questions();
        let results = index.query("zzz qqq", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_top_k_truncation() {
        let index = InMemoryIndex::with_default_questions();
        let results = index.query("haircut booking appointment", 2).await.unwrap();
        assert!(results.len() <= 2);
    }

    #[test]
    fn test_default_corpus_seeded() {
        let index = InMemoryIndex::with_default_questions();
        assert_eq!(index.len(), DEFAULT_QUESTIONS.len());
    }
}
