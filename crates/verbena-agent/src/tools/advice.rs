//! Beauty advice tool.

use async_trait::async_trait;
use serde_json::{Value, json};

use verbena_salon::BeautyAdvisor;

use crate::error::Result;
use crate::tool::{ParamKind, ParameterSchema, Tool, ToolOutput};

/// Tool producing structured beauty advice for a concern.
pub struct BeautyAdviceTool {
    advisor: BeautyAdvisor,
}

impl BeautyAdviceTool {
    /// Create the tool over an advisor.
    pub fn new(advisor: BeautyAdvisor) -> Self {
        Self { advisor }
    }
}

#[async_trait]
impl Tool for BeautyAdviceTool {
    fn name(&self) -> &str {
        "beauty_advice"
    }

    fn description(&self) -> &str {
        "Provide beauty advice and treatment recommendations for a concern, e.g. acne, dry hair, or brittle nails."
    }

    fn schema(&self) -> ParameterSchema {
        ParameterSchema::new().required(
            "concern",
            ParamKind::String,
            "The customer's beauty concern or question",
        )
    }

    async fn invoke(&self, args: Value) -> Result<ToolOutput> {
        let concern = args["concern"].as_str().unwrap_or_default();
        if concern.trim().is_empty() {
            return Ok(ToolOutput::error("concern cannot be empty"));
        }
        let advice = self.advisor.advise(concern);
        Ok(ToolOutput::json(json!({ "advice": advice })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_advice_for_known_concern() {
        let tool = BeautyAdviceTool::new(BeautyAdvisor::new());
        let output = tool
            .invoke(json!({"concern": "my hair has split ends"}))
            .await
            .unwrap();
        match output {
            ToolOutput::Json { content } => {
                assert_eq!(content["advice"]["category"], "hair");
                assert!(!content["advice"]["recommendations"].as_array().unwrap().is_empty());
            }
            other => panic!("expected JSON output, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_concern_is_soft_error() {
        let tool = BeautyAdviceTool::new(BeautyAdvisor::new());
        let output = tool.invoke(json!({"concern": "  "})).await.unwrap();
        assert!(output.is_error());
    }
}
