//! Reasoning-engine boundary for Verbena.
//!
//! This crate defines the synchronous request/response interface between the
//! turn orchestrator and the natural-language model that powers it:
//!
//! - [`types`]: completion requests/responses, messages, content blocks, and
//!   tool definitions
//! - [`backend`]: the [`ReasoningBackend`] trait, retry helper, and a
//!   scripted [`MockBackend`] for tests
//! - [`openai`]: an OpenAI-compatible HTTP backend
//!
//! The boundary is deliberately non-streaming: one bounded conversation plus
//! a tool catalog goes in, and either final text or a set of tool-call
//! requests comes back.

pub mod backend;
pub mod error;
pub mod openai;
pub mod types;

pub use backend::{MockBackend, ReasoningBackend, SharedBackend, with_retry};
pub use error::{LlmError, Result, is_retryable};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use types::{
    CompletionRequest, CompletionResponse, Content, ContentBlock, Message, Role, StopReason,
    ToolDefinition, ToolResultBlock, ToolUseBlock, Usage,
};
