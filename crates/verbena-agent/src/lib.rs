//! Conversational orchestration core for Verbena.
//!
//! This crate turns free-text utterances into structured actions against a
//! fixed catalog of salon-domain tools and back into natural-language
//! replies:
//!
//! - [`types`]: sessions, role-tagged turns, tool-call requests
//! - [`tool`]: parameter schemas, the [`Tool`] trait, and the
//!   [`ToolRegistry`]
//! - [`agent`]: the turn orchestrator ([`Agent`]) running the
//!   reasoning/tool-dispatch cycle
//! - [`tools`]: the salon domain tools
//! - [`service`]: [`ChatService`], the surface transports call
//!   (`handle_turn`, `get_suggestions`, `clear_conversation`)

pub mod agent;
pub mod error;
pub mod prompt;
pub mod service;
pub mod tool;
pub mod tools;
pub mod types;

pub use agent::{Agent, CAP_EXHAUSTED_REPLY};
pub use error::{AgentError, Result};
pub use service::{ChatService, FALLBACK_REPLY};
pub use tool::{
    ParamKind, ParameterSchema, ParameterSpec, ParameterValidationError, Tool, ToolOutput,
    ToolRegistry,
};
pub use types::{AgentConfig, Session, ToolCallRequest, Turn, TurnOutcome, TurnUsage};
