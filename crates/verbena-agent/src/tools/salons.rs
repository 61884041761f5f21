//! Salon directory tool.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use verbena_salon::SalonBackend;

use crate::error::{AgentError, Result};
use crate::tool::{ParamKind, ParameterSchema, Tool, ToolOutput};

/// Tool returning the salon profile and branch directory.
pub struct SearchSalonsTool {
    salon: Arc<dyn SalonBackend>,
}

impl SearchSalonsTool {
    /// Create the tool over a salon backend.
    pub fn new(salon: Arc<dyn SalonBackend>) -> Self {
        Self { salon }
    }
}

#[async_trait]
impl Tool for SearchSalonsTool {
    fn name(&self) -> &str {
        "search_salons"
    }

    fn description(&self) -> &str {
        "Get the salon profile and its branches: names, addresses, phone numbers, and opening hours."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new().optional(
            "query",
            ParamKind::String,
            "Optional filter on branch name or address",
        )
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let mut profile = self
            .salon
            .profile()
            .await
            .map_err(|e| AgentError::tool_failed(self.name(), e.to_string()))?;

        if let Some(query) = args["query"].as_str() {
            let needle = query.trim().to_lowercase();
            if !needle.is_empty() {
                profile.branches.retain(|b| {
                    b.name.to_lowercase().contains(&needle)
                        || b.address.to_lowercase().contains(&needle)
                });
            }
        }

        Ok(ToolOutput::json(json!({
            "salon": profile.name,
            "email": profile.email,
            "branches": profile.branches,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verbena_salon::InMemorySalon;

    fn tool() -> SearchSalonsTool {
        SearchSalonsTool::new(Arc::new(InMemorySalon::new()))
    }

    #[tokio::test]
    async fn test_lists_all_branches() {
        let output = tool().invoke(json!({})).await.unwrap();
        match output {
            ToolOutput::Json { content } => {
                assert_eq!(content["branches"].as_array().unwrap().len(), 2);
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_filters_branches() {
        let output = tool()
            .invoke(json!({"query": "riverside"}))
            .await
            .unwrap();
        match output {
            ToolOutput::Json { content } => {
                let branches = content["branches"].as_array().unwrap();
                assert_eq!(branches.len(), 1);
                assert_eq!(branches[0]["code"], "CN0002");
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }
}
