//! Tool framework for the orchestration core.
//!
//! This module defines the [`Tool`] trait all domain tools implement, the
//! declarative [`ParameterSchema`] used both to validate engine-issued
//! arguments and to describe capabilities to the reasoning engine, and the
//! [`ToolRegistry`] holding the fixed catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use verbena_agent::tool::{ParamKind, ParameterSchema, Tool, ToolOutput, ToolRegistry};
//!
//! struct MyTool;
//!
//! #[async_trait]
//! impl Tool for MyTool {
//!     fn name(&self) -> &str { "my_tool" }
//!     fn description(&self) -> &str { "Does something useful" }
//!     fn schema(&self) -> ParameterSchema {
//!         ParameterSchema::new().required("query", ParamKind::String, "what to look up")
//!     }
//!     async fn invoke(&self, args: Value) -> Result<ToolOutput> {
//!         Ok(ToolOutput::text("Done!"))
//!     }
//! }
//!
//! let mut registry = ToolRegistry::new();
//! registry.register(MyTool)?;
//! ```

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use verbena_llm::ToolDefinition;

use crate::error::{AgentError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Parameter Schema
// ─────────────────────────────────────────────────────────────────────────────

/// Primitive parameter types a tool may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// The JSON Schema type name.
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Whether a JSON value satisfies this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    /// Parameter name.
    pub name: String,
    /// Primitive type.
    pub kind: ParamKind,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Description shown to the reasoning engine.
    pub description: String,
}

/// A tool's declared parameters.
///
/// Validates engine-issued arguments (missing required parameter, wrong
/// primitive type, unknown parameter name) and renders the JSON Schema that
/// describes the tool's capability to the reasoning engine.
#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
    params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    /// Create an empty schema (a tool taking no parameters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required parameter.
    pub fn required(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
        });
        self
    }

    /// Declare an optional parameter.
    pub fn optional(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        description: impl Into<String>,
    ) -> Self {
        self.params.push(ParameterSpec {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
        });
        self
    }

    /// The declared parameters.
    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    /// Validate a JSON argument object against this schema.
    pub fn validate(&self, args: &Value) -> std::result::Result<(), ParameterValidationError> {
        let object = match args {
            Value::Object(map) => map,
            other => {
                return Err(ParameterValidationError::NotAnObject {
                    actual: json_type_name(other).to_string(),
                });
            }
        };

        let mut errors = Vec::new();

        for spec in &self.params {
            match object.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        errors.push(ParameterValidationError::MissingRequired {
                            name: spec.name.clone(),
                        });
                    }
                }
                Some(value) => {
                    if !spec.kind.matches(value) {
                        errors.push(ParameterValidationError::InvalidType {
                            name: spec.name.clone(),
                            expected: spec.kind.json_name(),
                            actual: json_type_name(value).to_string(),
                        });
                    }
                }
            }
        }

        for name in object.keys() {
            if !self.params.iter().any(|spec| &spec.name == name) {
                errors.push(ParameterValidationError::UnknownParameter { name: name.clone() });
            }
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.into_iter().next().unwrap()),
            _ => Err(ParameterValidationError::Multiple(errors)),
        }
    }

    /// Render the schema as a JSON Schema object for the tool catalog.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for spec in &self.params {
            properties.insert(
                spec.name.clone(),
                json!({
                    "type": spec.kind.json_name(),
                    "description": spec.description,
                }),
            );
            if spec.required {
                required.push(Value::String(spec.name.clone()));
            }
        }

        let mut schema = serde_json::Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        Value::Object(schema)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Error type for tool argument validation failures.
///
/// Messages are written for the reasoning engine: they say what was wrong
/// and how to fix it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParameterValidationError {
    /// Arguments were not a JSON object.
    #[error("arguments must be a JSON object, got {actual}")]
    NotAnObject {
        /// The actual JSON type.
        actual: String,
    },

    /// A required parameter is missing.
    #[error("missing required parameter '{name}'")]
    MissingRequired {
        /// The parameter name.
        name: String,
    },

    /// A parameter has an invalid type.
    #[error("invalid type for '{name}': expected {expected}, got {actual}")]
    InvalidType {
        /// The parameter name.
        name: String,
        /// The expected type.
        expected: &'static str,
        /// The actual type found.
        actual: String,
    },

    /// A parameter name is not declared by the tool.
    #[error("unknown parameter '{name}'")]
    UnknownParameter {
        /// The parameter name.
        name: String,
    },

    /// Multiple validation errors.
    #[error("argument validation failed: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ParameterValidationError>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Output
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a tool execution.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutput {
    /// Successful text output.
    Text {
        /// The text content.
        content: String,
    },
    /// Successful JSON output.
    Json {
        /// The JSON content.
        content: Value,
    },
    /// The tool ran but could not produce a useful result.
    Error {
        /// Error message, phrased for the reasoning engine.
        message: String,
    },
}

impl ToolOutput {
    /// Create a text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    /// Create a JSON result.
    pub fn json(content: Value) -> Self {
        Self::Json { content }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Check if this result is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Get the content as a string for reasoning-engine consumption.
    pub fn to_llm_content(&self) -> String {
        match self {
            Self::Text { content } => content.clone(),
            Self::Json { content } => {
                serde_json::to_string(content).unwrap_or_else(|_| content.to_string())
            }
            Self::Error { message } => format!("Error: {}", message),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A named, schema-described domain operation the reasoning engine may
/// request.
///
/// Arguments reach `invoke` only after they have been validated against
/// [`Tool::schema`] by the registry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the unique name of this tool.
    fn name(&self) -> &str;

    /// Get a human-readable description of what this tool does.
    fn description(&self) -> &str;

    /// Get the declared parameter schema.
    fn schema(&self) -> ParameterSchema;

    /// Execute the tool with validated arguments.
    async fn invoke(&self, args: Value) -> Result<ToolOutput>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool Registry
// ─────────────────────────────────────────────────────────────────────────────

/// The fixed catalog of callable tools.
///
/// Registration happens once at process start and fails on duplicate names;
/// after that the registry is read-only and safely shared without locking.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    /// Registration order, so the catalog presented to the reasoning engine
    /// is stable.
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, failing if the name is already taken.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool from an Arc, failing if the name is already taken.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|s| s.as_str()).collect()
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The capability catalog for the reasoning engine: name, description,
    /// and parameter schema, never implementation.
    pub fn describe(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| {
                ToolDefinition::new(
                    tool.name(),
                    tool.description(),
                    tool.schema().to_json_schema(),
                )
            })
            .collect()
    }

    /// Validate arguments against the declared schema and invoke the tool.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<ToolOutput> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))?;

        tool.schema()
            .validate(&args)
            .map_err(|source| AgentError::InvalidArguments {
                tool: name.to_string(),
                source,
            })?;

        tool.invoke(args).await.map_err(|e| match e {
            // Keep structured errors; wrap anything else as execution failure.
            AgentError::ToolFailed { .. } => e,
            other => AgentError::tool_failed(name, other.to_string()),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the message back"
        }

        fn schema(&self) -> ParameterSchema {
            ParameterSchema::new()
                .required("message", ParamKind::String, "text to echo")
                .optional("repeat", ParamKind::Integer, "how many times")
        }

        async fn invoke(&self, args: Value) -> Result<ToolOutput> {
            let message = args["message"].as_str().unwrap_or_default();
            let repeat = args["repeat"].as_u64().unwrap_or(1) as usize;
            Ok(ToolOutput::text(message.repeat(repeat)))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn schema(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        async fn invoke(&self, _args: Value) -> Result<ToolOutput> {
            Err(AgentError::tool_failed("broken", "backend offline"))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();
        registry.register(FailingTool).unwrap();
        registry
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = registry();
        let err = registry.register(EchoTool).unwrap_err();
        assert!(matches!(err, AgentError::DuplicateTool(name) if name == "echo"));
    }

    #[test]
    fn test_describe_is_stable_and_schema_only() {
        let registry = registry();
        let catalog = registry.describe();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].name, "echo");
        assert_eq!(catalog[1].name, "broken");

        let schema = &catalog[0].input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["message"]["type"], "string");
        assert_eq!(schema["required"][0], "message");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let registry = registry();
        let err = registry.invoke("nope", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_invoke_validates_arguments() {
        let registry = registry();

        // Missing required parameter
        let err = registry.invoke("echo", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::InvalidArguments { .. }));

        // Wrong primitive type
        let err = registry
            .invoke("echo", json!({"message": 42}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidArguments {
                source: ParameterValidationError::InvalidType { .. },
                ..
            }
        ));

        // Unknown parameter name
        let err = registry
            .invoke("echo", json!({"message": "hi", "volume": 11}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidArguments {
                source: ParameterValidationError::UnknownParameter { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let registry = registry();
        let output = registry
            .invoke("echo", json!({"message": "hi", "repeat": 2}))
            .await
            .unwrap();
        assert_eq!(output.to_llm_content(), "hihi");
    }

    #[tokio::test]
    async fn test_invoke_propagates_execution_failure() {
        let registry = registry();
        let err = registry.invoke("broken", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolFailed { .. }));
        assert!(err.to_string().contains("backend offline"));
    }

    #[test]
    fn test_schema_rejects_non_object_arguments() {
        let schema = ParameterSchema::new().required("q", ParamKind::String, "query");
        let err = schema.validate(&json!("just a string")).unwrap_err();
        assert!(matches!(err, ParameterValidationError::NotAnObject { .. }));
    }

    #[test]
    fn test_schema_collects_multiple_errors() {
        let schema = ParameterSchema::new()
            .required("a", ParamKind::String, "")
            .required("b", ParamKind::Integer, "");
        let err = schema.validate(&json!({"c": true})).unwrap_err();
        match err {
            ParameterValidationError::Multiple(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let schema = ParameterSchema::new()
            .required("a", ParamKind::String, "")
            .optional("b", ParamKind::String, "");
        // Null for an optional parameter is fine; for a required one it is missing.
        assert!(schema.validate(&json!({"a": "x", "b": null})).is_ok());
        assert!(matches!(
            schema.validate(&json!({"a": null})).unwrap_err(),
            ParameterValidationError::MissingRequired { .. }
        ));
    }

    #[test]
    fn test_tool_output_llm_content() {
        assert_eq!(ToolOutput::text("hi").to_llm_content(), "hi");
        assert_eq!(
            ToolOutput::json(json!({"slots": ["10:00"]})).to_llm_content(),
            "{\"slots\":[\"10:00\"]}"
        );
        assert_eq!(
            ToolOutput::error("nope").to_llm_content(),
            "Error: nope"
        );
        assert!(ToolOutput::error("nope").is_error());
    }
}
