//! OpenAI-compatible API backend implementation.
//!
//! This module provides [`OpenAiBackend`] which connects to OpenAI's API or
//! any OpenAI-compatible service (Azure OpenAI deployments behind a
//! compatible gateway, Groq, Ollama, local LLMs, etc.).

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backend::{ReasoningBackend, with_retry};
use crate::error::{LlmError, Result};
use crate::types::{
    CompletionRequest, CompletionResponse, Content, ContentBlock, Role, StopReason, Usage,
};

/// Default OpenAI API base URL.
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com/v1";

/// Default timeout for requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication (optional for local services like Ollama).
    pub api_key: Option<String>,

    /// Base URL for the API.
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,

    /// Name for this backend instance.
    pub name: String,
}

impl OpenAiConfig {
    /// Create a new config for OpenAI.
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: DEFAULT_OPENAI_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            name: "openai".to_string(),
        }
    }

    /// Create a new config for Ollama (local).
    pub fn ollama() -> Self {
        Self {
            api_key: None,
            base_url: "http://localhost:11434/v1".to_string(),
            timeout: Duration::from_secs(600),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            name: "ollama".to_string(),
        }
    }

    /// Create config from the `OPENAI_API_KEY` environment variable.
    pub fn openai_from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            LlmError::Config("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::openai(api_key))
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the backend name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments, as the chat completions API delivers them.
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunctionDef,
}

#[derive(Debug, Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    id: String,
    model: String,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────────────────

/// OpenAI-compatible API backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create an OpenAI backend from environment.
    pub fn openai_from_env() -> Result<Self> {
        Self::new(OpenAiConfig::openai_from_env()?)
    }

    /// Build the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn send_once(&self, body: &WireRequest) -> Result<CompletionResponse> {
        let mut request = self
            .client
            .post(self.completions_url())
            .header(header::CONTENT_TYPE, "application/json")
            .json(body);

        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Auth(text),
                429 => LlmError::RateLimit(text),
                400 | 404 | 422 => LlmError::InvalidRequest(text),
                _ => LlmError::Backend(format!("HTTP {}: {}", status, text)),
            });
        }

        let wire: WireResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::MalformedOutput(format!("unparseable response body: {}", e)))?;

        parse_response(wire)
    }
}

/// Convert a completion request into the chat completions wire format.
fn build_wire_request(request: &CompletionRequest) -> WireRequest {
    let mut messages = Vec::new();

    if let Some(ref system) = request.system {
        messages.push(WireMessage::plain("system", system.clone()));
    }

    for message in &request.messages {
        match (&message.role, &message.content) {
            (Role::User, Content::Text(text)) => {
                messages.push(WireMessage::plain("user", text.clone()));
            }
            (Role::Assistant, Content::Text(text)) => {
                messages.push(WireMessage::plain("assistant", text.clone()));
            }
            (role, Content::Blocks(blocks)) => {
                let mut text_parts = Vec::new();
                let mut tool_calls = Vec::new();
                let mut tool_results = Vec::new();

                for block in blocks {
                    match block {
                        ContentBlock::Text { text } => text_parts.push(text.clone()),
                        ContentBlock::ToolUse { id, name, input } => {
                            tool_calls.push(WireToolCall {
                                id: id.clone(),
                                call_type: "function".to_string(),
                                function: WireFunctionCall {
                                    name: name.clone(),
                                    arguments: input.to_string(),
                                },
                            });
                        }
                        ContentBlock::ToolResult {
                            tool_use_id,
                            content,
                            is_error,
                        } => {
                            let content = if *is_error {
                                format!("Error: {}", content)
                            } else {
                                content.clone()
                            };
                            tool_results.push(WireMessage {
                                role: "tool".to_string(),
                                content: Some(content),
                                tool_calls: None,
                                tool_call_id: Some(tool_use_id.clone()),
                            });
                        }
                    }
                }

                // Tool results travel as their own `tool`-role messages.
                if !tool_results.is_empty() {
                    messages.extend(tool_results);
                }

                if !text_parts.is_empty() || !tool_calls.is_empty() {
                    let role = match role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    };
                    messages.push(WireMessage {
                        role: role.to_string(),
                        content: if text_parts.is_empty() {
                            None
                        } else {
                            Some(text_parts.join(""))
                        },
                        tool_calls: if tool_calls.is_empty() {
                            None
                        } else {
                            Some(tool_calls)
                        },
                        tool_call_id: None,
                    });
                }
            }
        }
    }

    let tools = request
        .tools
        .iter()
        .map(|t| WireTool {
            tool_type: "function".to_string(),
            function: WireFunctionDef {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.input_schema.clone(),
            },
        })
        .collect();

    WireRequest {
        model: request.model.clone(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        tools,
    }
}

/// Convert a chat completions wire response into a [`CompletionResponse`].
fn parse_response(wire: WireResponse) -> Result<CompletionResponse> {
    let choice = wire
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedOutput("response contained no choices".to_string()))?;

    let mut content = Vec::new();

    if let Some(text) = choice.message.content
        && !text.is_empty()
    {
        content.push(ContentBlock::Text { text });
    }

    for call in choice.message.tool_calls.unwrap_or_default() {
        let input: serde_json::Value =
            serde_json::from_str(&call.function.arguments).map_err(|e| {
                LlmError::MalformedOutput(format!(
                    "tool call '{}' has unparseable arguments: {}",
                    call.function.name, e
                ))
            })?;
        content.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("tool_calls") => Some(StopReason::ToolUse),
        Some("length") => Some(StopReason::MaxTokens),
        Some(_) => Some(StopReason::EndTurn),
        None => None,
    };

    let usage = wire
        .usage
        .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: wire.id,
        model: wire.model,
        content,
        stop_reason,
        usage,
    })
}

#[async_trait]
impl ReasoningBackend for OpenAiBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = build_wire_request(&request);

        tracing::debug!(
            backend = %self.config.name,
            model = %request.model,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending completion request"
        );

        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            &self.config.name,
            || self.send_once(&body),
        )
        .await
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn health_check(&self) -> Result<()> {
        if self.config.api_key.is_none() && self.config.base_url == DEFAULT_OPENAI_BASE {
            return Err(LlmError::Config(
                "API key required for hosted endpoint".to_string(),
            ));
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Message, ToolDefinition, ToolResultBlock};
    use serde_json::json;

    #[test]
    fn test_build_wire_request_plain_conversation() {
        let request = CompletionRequest::new(
            "gpt-4o-mini",
            vec![Message::user("Hi"), Message::assistant("Hello!")],
            256,
        )
        .with_system("Be helpful.");

        let wire = build_wire_request(&request);
        assert_eq!(wire.messages.len(), 3);
        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[1].role, "user");
        assert_eq!(wire.messages[2].role, "assistant");
        assert_eq!(wire.messages[2].content.as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_build_wire_request_tool_round_trip() {
        let request = CompletionRequest::new(
            "gpt-4o-mini",
            vec![
                Message::user("Haircut tomorrow?"),
                Message::assistant_blocks(vec![
                    ContentBlock::text("Checking."),
                    ContentBlock::tool_use("call_1", "check_availability", json!({"service": "haircut"})),
                ]),
                Message::tool_results(vec![ToolResultBlock::success(
                    "call_1",
                    "{\"slots\":[\"10:00\"]}",
                )]),
            ],
            256,
        )
        .with_tools(vec![ToolDefinition::new(
            "check_availability",
            "Check slots",
            json!({"type": "object", "properties": {}}),
        )]);

        let wire = build_wire_request(&request);

        // user, assistant-with-tool-calls, tool
        assert_eq!(wire.messages.len(), 3);

        let assistant = &wire.messages[1];
        assert_eq!(assistant.role, "assistant");
        let calls = assistant.tool_calls.as_ref().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.name, "check_availability");

        let tool = &wire.messages[2];
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));

        assert_eq!(wire.tools.len(), 1);
        assert_eq!(wire.tools[0].function.name, "check_availability");
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let wire: WireResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "check_availability",
                            "arguments": "{\"service\":\"haircut\",\"date\":\"tomorrow\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 42, "completion_tokens": 7}
        }))
        .unwrap();

        let response = parse_response(wire).unwrap();
        assert!(response.has_tool_use());
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        let uses = response.tool_uses();
        assert_eq!(uses[0].input["date"], "tomorrow");
        assert_eq!(response.usage.input_tokens, 42);
    }

    #[test]
    fn test_parse_response_malformed_arguments() {
        let wire: WireResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "check_availability", "arguments": "{not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }))
        .unwrap();

        let err = parse_response(wire).unwrap_err();
        assert!(matches!(err, LlmError::MalformedOutput(_)));
    }

    #[test]
    fn test_parse_response_empty_choices() {
        let wire: WireResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": []
        }))
        .unwrap();

        assert!(matches!(
            parse_response(wire),
            Err(LlmError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_completions_url() {
        let backend = OpenAiBackend::new(
            OpenAiConfig::openai("key").with_base_url("http://localhost:8000/v1/"),
        )
        .unwrap();
        assert_eq!(
            backend.completions_url(),
            "http://localhost:8000/v1/chat/completions"
        );
    }
}
