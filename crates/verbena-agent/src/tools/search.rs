//! Semantic search tool over the similarity index.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use verbena_suggest::SimilarityBackend;

use crate::error::Result;
use crate::tool::{ParamKind, ParameterSchema, Tool, ToolOutput};

/// Default number of matches returned.
const DEFAULT_LIMIT: u64 = 5;

/// Tool running a semantic similarity search across the indexed salon data.
pub struct SemanticSearchTool {
    index: Arc<dyn SimilarityBackend>,
}

impl SemanticSearchTool {
    /// Create the tool over a similarity backend.
    pub fn new(index: Arc<dyn SimilarityBackend>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for SemanticSearchTool {
    fn name(&self) -> &str {
        "semantic_search"
    }

    fn description(&self) -> &str {
        "Perform a semantic search across indexed salon knowledge for content related to the query."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("query", ParamKind::String, "What to search for")
            .optional("limit", ParamKind::Integer, "Maximum number of matches (default 5)")
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let query = args["query"].as_str().unwrap_or_default();
        let limit = args["limit"].as_u64().unwrap_or(DEFAULT_LIMIT).max(1) as usize;

        // The index is best-effort: an unreachable backend degrades to an
        // empty result rather than failing the turn.
        let matches = match self.index.query(query, limit).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "Semantic search backend failed");
                Vec::new()
            }
        };

        if matches.is_empty() {
            return Ok(ToolOutput::text(format!("No matches for '{query}'.")));
        }
        Ok(ToolOutput::json(json!({ "matches": matches })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbena_suggest::{IndexError, InMemoryIndex, ScoredItem};

    #[tokio::test]
    async fn test_returns_scored_matches() {
        let tool = SemanticSearchTool::new(Arc::new(InMemoryIndex::with_default_questions()));
        let output = tool
            .invoke(json!({"query": "haircut tomorrow", "limit": 3}))
            .await
            .unwrap();
        match output {
            ToolOutput::Json { content } => {
                let matches = content["matches"].as_array().unwrap();
                assert!(!matches.is_empty());
                assert!(matches.len() <= 3);
                assert!(matches[0]["score"].as_f64().unwrap() > 0.0);
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_degrades_to_no_matches() {
        struct Down;

        #[async_trait]
        impl SimilarityBackend for Down {
            async fn query(
                &self,
                _text: &str,
                _top_k: usize,
            ) -> verbena_suggest::Result<Vec<ScoredItem>> {
                Err(IndexError::Unreachable("nope".to_string()))
            }
        }

        let tool = SemanticSearchTool::new(Arc::new(Down));
        let output = tool.invoke(json!({"query": "anything"})).await.unwrap();
        assert!(!output.is_error());
        assert!(output.to_llm_content().contains("No matches"));
    }
}
