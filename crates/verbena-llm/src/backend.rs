//! Reasoning backend trait and mock implementation.
//!
//! This module defines the abstraction layer for reasoning-engine providers
//! (OpenAI-compatible services, local models) and provides a scripted mock
//! for deterministic testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{LlmError, Result, is_retryable};
use crate::types::{CompletionRequest, CompletionResponse};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Retry Logic
// ─────────────────────────────────────────────────────────────────────────────

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures, rate limits).
/// Non-retryable errors are returned immediately.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    let mut backoff = initial_backoff;

    for attempt in 0..=max_retries {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }

                last_error = Some(e);

                if attempt < max_retries {
                    tracing::warn!(
                        backend = backend_name,
                        attempt = attempt + 1,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap())
}

// ─────────────────────────────────────────────────────────────────────────────
// Reasoning Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for reasoning-engine providers.
///
/// Implementations provide the actual connection to a completion service.
/// The boundary is deliberately synchronous request/response: one bounded
/// conversation plus a tool catalog in, one reply or tool-call set out.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Check if the backend is available and properly configured.
    async fn health_check(&self) -> Result<()>;
}

/// A backend that can be shared across threads.
pub type SharedBackend = Arc<dyn ReasoningBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A mock backend for testing purposes.
///
/// Returns pre-configured responses in order and logs every request it
/// receives, useful for deterministic testing of the turn orchestrator.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    responses: std::sync::Mutex<Vec<CompletionResponse>>,
    request_log: std::sync::Mutex<Vec<CompletionRequest>>,
    /// When set, every response is this one (for unbounded-loop tests).
    repeat: Option<CompletionResponse>,
    /// When set, every call fails with a backend error.
    fail_with: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    ///
    /// Responses are returned in order. If more requests are made than
    /// responses available, an error is returned.
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
            repeat: None,
            fail_with: None,
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![CompletionResponse::text_reply("mock_msg_1", text)])
    }

    /// Create a mock backend that returns the same response forever.
    pub fn repeating(response: CompletionResponse) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(Vec::new()),
            request_log: std::sync::Mutex::new(Vec::new()),
            repeat: Some(response),
            fail_with: None,
        }
    }

    /// Create a mock backend where every call fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(Vec::new()),
            request_log: std::sync::Mutex::new(Vec::new()),
            repeat: None,
            fail_with: Some(message.into()),
        }
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[async_trait]
impl ReasoningBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        // Log the request
        self.request_log.lock().unwrap().push(request);

        if let Some(ref message) = self.fail_with {
            return Err(LlmError::Backend(message.clone()));
        }

        if let Some(ref response) = self.repeat {
            return Ok(response.clone());
        }

        // Return the next response
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::Backend(
                "MockBackend: no more responses available".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentBlock, Message, StopReason, Usage};

    #[tokio::test]
    async fn test_mock_backend_single_response() {
        let backend = MockBackend::with_text("Hello!");

        let request = CompletionRequest::new("test-model", vec![Message::user("Hi")], 100);
        let response = backend.complete(request).await.unwrap();

        assert_eq!(response.text(), "Hello!");
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_responses_in_order() {
        let backend = MockBackend::new(vec![
            CompletionResponse::text_reply("msg_1", "First"),
            CompletionResponse::text_reply("msg_2", "Second"),
        ]);

        let request = CompletionRequest::new("test-model", vec![Message::user("1")], 100);
        let r1 = backend.complete(request).await.unwrap();

        let request = CompletionRequest::new("test-model", vec![Message::user("2")], 100);
        let r2 = backend.complete(request).await.unwrap();

        assert_eq!(r1.text(), "First");
        assert_eq!(r2.text(), "Second");
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted() {
        let backend = MockBackend::new(vec![]);

        let request = CompletionRequest::new("test-model", vec![Message::user("Hi")], 100);
        let result = backend.complete(request).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_backend_repeating() {
        let backend = MockBackend::repeating(CompletionResponse::text_reply("msg", "again"));

        for _ in 0..5 {
            let request = CompletionRequest::new("test-model", vec![Message::user("Hi")], 100);
            let response = backend.complete(request).await.unwrap();
            assert_eq!(response.text(), "again");
        }
        assert_eq!(backend.request_count(), 5);
    }

    #[tokio::test]
    async fn test_mock_backend_failing() {
        let backend = MockBackend::failing("engine offline");

        let request = CompletionRequest::new("test-model", vec![Message::user("Hi")], 100);
        let err = backend.complete(request).await.unwrap_err();
        assert!(matches!(err, LlmError::Backend(_)));
        // The failed request is still logged
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_with_tool_use() {
        let backend = MockBackend::new(vec![CompletionResponse::new(
            "msg_1",
            "model",
            vec![
                ContentBlock::text("Let me check."),
                ContentBlock::tool_use(
                    "call_1",
                    "check_availability",
                    serde_json::json!({"service": "haircut", "date": "tomorrow"}),
                ),
            ],
            StopReason::ToolUse,
            Usage::new(50, 30),
        )]);

        let request =
            CompletionRequest::new("test-model", vec![Message::user("Haircut tomorrow?")], 100);
        let response = backend.complete(request).await.unwrap();

        assert!(response.has_tool_use());
        assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(response.tool_uses()[0].name, "check_availability");
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_on_fatal_errors() {
        let mut calls = 0u32;
        let result: Result<()> = with_retry(3, Duration::from_millis(1), "test", || {
            calls += 1;
            async { Err(LlmError::Auth("bad key".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(LlmError::Auth(_))));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_with_retry_retries_transient_errors() {
        let mut calls = 0u32;
        let result = with_retry(3, Duration::from_millis(1), "test", || {
            calls += 1;
            let attempt = calls;
            async move {
                if attempt < 3 {
                    Err(LlmError::Network("flaky".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }
}
