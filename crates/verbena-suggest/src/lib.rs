//! Similarity-driven follow-up suggestions for Verbena.
//!
//! Given a conversation topic, the [`SuggestionEngine`] queries a semantic
//! similarity backend and returns a ranked, capped list of follow-up
//! questions. Failures degrade to an empty list; suggestions are never
//! allowed to fail a conversational turn.

mod backend;
mod engine;
mod index;

pub use backend::{IndexError, Result, ScoredItem, SimilarityBackend};
pub use engine::{SuggestConfig, SuggestionEngine};
pub use index::InMemoryIndex;
