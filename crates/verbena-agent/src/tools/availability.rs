//! Availability lookup tool.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;

use verbena_salon::{AvailabilityQuery, SalonBackend};

use crate::error::{AgentError, Result};
use crate::tool::{ParamKind, ParameterSchema, Tool, ToolOutput};

/// Tool checking open appointment slots.
pub struct CheckAvailabilityTool {
    salon: Arc<dyn SalonBackend>,
}

impl CheckAvailabilityTool {
    /// Create the tool over a salon backend.
    pub fn new(salon: Arc<dyn SalonBackend>) -> Self {
        Self { salon }
    }
}

#[async_trait]
impl Tool for CheckAvailabilityTool {
    fn name(&self) -> &str {
        "check_availability"
    }

    fn description(&self) -> &str {
        "Check appointment availability for beauty salon services. Returns open time slots for a service on a date."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("service", ParamKind::String, "Service to check, e.g. 'haircut' or 'facial'")
            .required("date", ParamKind::String, "Date to check: YYYY-MM-DD, 'today', or 'tomorrow'")
            .optional("time", ParamKind::String, "Earliest acceptable time, HH:MM")
            .optional("branch", ParamKind::String, "Branch code, if the customer named one")
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let query = AvailabilityQuery {
            service: args["service"].as_str().unwrap_or_default().to_string(),
            date: args["date"].as_str().unwrap_or_default().to_string(),
            time: args["time"].as_str().map(String::from),
            branch: args["branch"].as_str().map(String::from),
        };

        match self.salon.check_availability(&query).await {
            Ok(slots) if slots.is_empty() => Ok(ToolOutput::text(format!(
                "No open slots for {} on {}.",
                query.service, query.date
            ))),
            Ok(slots) => Ok(ToolOutput::json(json!({ "slots": slots }))),
            Err(e @ verbena_salon::SalonError::UnknownService(_))
            | Err(e @ verbena_salon::SalonError::InvalidDate(_)) => {
                // Input-shaped problems go back to the engine as soft errors
                // so it can rephrase or ask the customer.
                Ok(ToolOutput::error(e.to_string()))
            }
            Err(e) => Err(AgentError::tool_failed(self.name(), e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use verbena_salon::InMemorySalon;

    fn tool() -> CheckAvailabilityTool {
        let salon = InMemorySalon::new()
            .with_reference_date(NaiveDate::from_ymd_opt(2025, 7, 14).unwrap());
        CheckAvailabilityTool::new(Arc::new(salon))
    }

    #[tokio::test]
    async fn test_returns_slots_as_json() {
        let output = tool()
            .invoke(json!({"service": "haircut", "date": "tomorrow"}))
            .await
            .unwrap();

        match output {
            ToolOutput::Json { content } => {
                let slots = content["slots"].as_array().unwrap();
                assert!(!slots.is_empty());
                assert_eq!(slots[0]["date"], "2025-07-15");
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_service_is_soft_error() {
        let output = tool()
            .invoke(json!({"service": "time travel", "date": "tomorrow"}))
            .await
            .unwrap();
        assert!(output.is_error());
        assert!(output.to_llm_content().contains("Unknown service"));
    }

    #[tokio::test]
    async fn test_bad_date_is_soft_error() {
        let output = tool()
            .invoke(json!({"service": "haircut", "date": "someday"}))
            .await
            .unwrap();
        assert!(output.is_error());
    }
}
