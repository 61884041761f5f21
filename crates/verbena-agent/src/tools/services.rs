//! Service catalog search tool.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use verbena_salon::SalonBackend;

use crate::error::{AgentError, Result};
use crate::tool::{ParamKind, ParameterSchema, Tool, ToolOutput};

/// Default number of services returned.
const DEFAULT_LIMIT: u64 = 10;

/// Tool searching services, treatments, and pricing.
pub struct SearchServicesTool {
    salon: Arc<dyn SalonBackend>,
}

impl SearchServicesTool {
    /// Create the tool over a salon backend.
    pub fn new(salon: Arc<dyn SalonBackend>) -> Self {
        Self { salon }
    }
}

#[async_trait]
impl Tool for SearchServicesTool {
    fn name(&self) -> &str {
        "search_services"
    }

    fn description(&self) -> &str {
        "Search for beauty services, treatments, and pricing information. An empty query lists the whole catalog."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("query", ParamKind::String, "What to search for, e.g. 'nails' or 'coloring'")
            .optional("limit", ParamKind::Integer, "Maximum number of results (default 10)")
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let query = args["query"].as_str().unwrap_or_default();
        let limit = args["limit"].as_u64().unwrap_or(DEFAULT_LIMIT).max(1) as usize;

        let services = self
            .salon
            .search_services(query, limit)
            .await
            .map_err(|e| AgentError::tool_failed(self.name(), e.to_string()))?;

        if services.is_empty() {
            return Ok(ToolOutput::text(format!(
                "No services matched '{query}'."
            )));
        }
        Ok(ToolOutput::json(json!({ "services": services })))
    }
}
