//! Core types for the orchestration core.
//!
//! This module defines the fundamental conversation types:
//! - [`Session`]: per-conversation state container
//! - [`Turn`]: one role-tagged message in a session's history
//! - [`ToolCallRequest`]: a structured tool invocation issued by the
//!   reasoning engine
//! - [`AgentConfig`]: runtime configuration for the turn loop
//! - [`TurnOutcome`]: the orchestrator's output for one turn

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Tool Call Request
// ─────────────────────────────────────────────────────────────────────────────

/// A structured request, issued by the reasoning engine, to invoke a tool.
///
/// The `request_id` correlates the request with its result inside one turn;
/// the orchestrator never invokes the same id twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Engine-assigned id correlating request and result.
    pub request_id: String,
    /// Name of the tool to invoke.
    pub tool_name: String,
    /// Arguments as a JSON object.
    pub arguments: serde_json::Value,
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn
// ─────────────────────────────────────────────────────────────────────────────

/// One role-tagged message in a conversation's history.
///
/// Immutable once appended to a session. A `Tool` turn always follows the
/// assistant turn carrying the [`ToolCallRequest`] with the same
/// `request_id` (possibly with sibling tool turns in between).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Turn {
    /// A user utterance.
    User {
        /// The utterance text.
        content: String,
        /// When the turn was appended.
        at: DateTime<Utc>,
    },
    /// An assistant message, optionally carrying tool-call requests.
    Assistant {
        /// Reply text (may be empty on a pure tool-dispatch pass).
        content: String,
        /// Tool calls requested in this message.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCallRequest>,
        /// When the turn was appended.
        at: DateTime<Utc>,
    },
    /// A tool result, linked to its originating request.
    Tool {
        /// Id of the tool call this result answers.
        request_id: String,
        /// Name of the invoked tool.
        tool_name: String,
        /// Result content (success value or failure description).
        content: String,
        /// Whether the invocation failed.
        #[serde(default)]
        is_error: bool,
        /// When the turn was appended.
        at: DateTime<Utc>,
    },
}

impl Turn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            at: Utc::now(),
        }
    }

    /// Create a plain assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
            at: Utc::now(),
        }
    }

    /// Create an assistant turn carrying tool-call requests.
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: calls,
            at: Utc::now(),
        }
    }

    /// Create a tool result turn.
    pub fn tool(
        request_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self::Tool {
            request_id: request_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
            is_error,
            at: Utc::now(),
        }
    }

    /// The turn's role as a string.
    pub fn role(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Whether this is a tool turn.
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// The state of one ongoing conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque id assigned by the transport layer.
    pub id: String,
    /// Ordered turn history; insertion order is replay order.
    pub history: Vec<Turn>,
    /// Topic seeding the suggestion engine; empty until the first reply.
    pub current_topic: String,
    /// When this session was created.
    pub created_at: DateTime<Utc>,
    /// When this session last changed; drives idle eviction policy.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            history: Vec::new(),
            current_topic: String::new(),
            created_at: now,
            last_activity: now,
        }
    }

    /// Append a turn to the history.
    pub fn append(&mut self, turn: Turn) {
        self.history.push(turn);
        self.last_activity = Utc::now();
    }

    /// Discard all turns and reset the topic.
    pub fn clear(&mut self) {
        self.history.clear();
        self.current_topic.clear();
        self.last_activity = Utc::now();
    }

    /// Update the current topic.
    pub fn set_topic(&mut self, topic: impl Into<String>) {
        self.current_topic = topic.into();
    }

    /// Number of turns in the history.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Check if the session has no turns.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The most recent `max_turns` of history, widened backwards so the
    /// window never starts on a tool turn; a tool result is only replayed
    /// together with the assistant turn that requested it.
    pub fn replay_window(&self, max_turns: usize) -> &[Turn] {
        let mut start = self.history.len().saturating_sub(max_turns);
        while start > 0 && self.history[start].is_tool() {
            start -= 1;
        }
        &self.history[start..]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Agent Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the turn orchestrator.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier to use.
    pub model: String,
    /// Maximum tokens for reasoning responses.
    pub max_tokens: u32,
    /// Temperature for sampling.
    pub temperature: Option<f32>,
    /// Hard cap on reasoning passes per turn.
    pub max_iterations: u32,
    /// How many history turns are replayed to the reasoning engine.
    pub history_window: usize,
    /// Timeout for each reasoning call; expiry is fatal to the turn.
    pub reasoning_timeout: Duration,
    /// Timeout for each tool invocation; expiry folds as a tool failure.
    pub tool_timeout: Duration,
    /// System prompt override; when `None` the default persona is used.
    pub system_prompt: Option<String>,
}

impl AgentConfig {
    /// Create a new config with the specified model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 1024,
            temperature: None,
            max_iterations: 6,
            history_window: 20,
            reasoning_timeout: Duration::from_secs(60),
            tool_timeout: Duration::from_secs(30),
            system_prompt: None,
        }
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set max iterations.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the replayed history window.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Set the reasoning-call timeout.
    pub fn with_reasoning_timeout(mut self, timeout: Duration) -> Self {
        self.reasoning_timeout = timeout;
        self
    }

    /// Set the per-tool timeout.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Set a system prompt override.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new("gpt-4o-mini")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Turn Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Token usage accumulated across one turn's reasoning passes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TurnUsage {
    /// Input tokens consumed.
    pub input_tokens: u32,
    /// Output tokens generated.
    pub output_tokens: u32,
}

/// The orchestrator's output for one completed turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Final reply text.
    pub reply: String,
    /// Reasoning passes used.
    pub iterations: u32,
    /// Distinct tool invocations dispatched.
    pub tool_calls: usize,
    /// Whether the iteration cap forced a degraded reply.
    pub truncated: bool,
    /// Token usage for the turn.
    pub usage: TurnUsage,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
