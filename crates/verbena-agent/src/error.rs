//! Error types for the orchestration core.

use thiserror::Error;

use crate::tool::ParameterValidationError;

/// Result type alias using the agent error type.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for orchestration operations.
///
/// Tool-level failures (`UnknownTool`, `InvalidArguments`, `ToolFailed`) are
/// recovered locally by the turn loop: they are folded into history as tool
/// turns and never surface raw to the end user. `Reasoning` errors and the
/// iteration cap degrade the whole turn to a generic reply. `UnknownSession`
/// and `DuplicateTool` are programming errors at the call site.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Reasoning engine error (unreachable, timed out, or malformed output).
    #[error("Reasoning engine error: {0}")]
    Reasoning(#[from] verbena_llm::LlmError),

    /// Tool not found in registry.
    #[error("Tool not found: {0}")]
    UnknownTool(String),

    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    /// Tool arguments did not satisfy the declared parameter schema.
    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        /// The tool whose schema was violated.
        tool: String,
        /// What was wrong with the arguments.
        #[source]
        source: ParameterValidationError,
    },

    /// Tool execution failed.
    #[error("Tool '{name}' failed: {message}")]
    ToolFailed {
        /// The failing tool.
        name: String,
        /// Underlying cause.
        message: String,
    },

    /// The reasoning/tool-dispatch cycle hit its iteration cap.
    #[error("Maximum reasoning iterations exceeded: {0}")]
    IterationCap(u32),

    /// Session store error.
    #[error("Session error: {0}")]
    Session(#[from] verbena_session::Error),
}

impl AgentError {
    /// Create a tool execution failure.
    pub fn tool_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Whether this error is recovered inside the turn (folded into history)
    /// rather than failing the turn.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool(_) | Self::InvalidArguments { .. } | Self::ToolFailed { .. }
        )
    }
}
