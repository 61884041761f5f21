//! The turn orchestrator.
//!
//! [`Agent`] runs one conversational turn as a small state machine:
//! the utterance is appended to the session, the bounded history plus the
//! tool catalog goes to the reasoning engine, any requested tool calls are
//! validated and dispatched concurrently, and the cycle repeats until the
//! engine produces a final reply or the iteration cap trips.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::future::join_all;
use tokio::time::timeout;

use verbena_llm::{CompletionRequest, ContentBlock, LlmError, Message, SharedBackend, ToolResultBlock, ToolUseBlock};

use crate::error::{AgentError, Result};
use crate::prompt::default_system_prompt;
use crate::tool::ToolRegistry;
use crate::types::{AgentConfig, Session, ToolCallRequest, Turn, TurnOutcome, TurnUsage};

/// Degraded reply used when the reasoning/tool-dispatch cycle hits its cap.
pub const CAP_EXHAUSTED_REPLY: &str =
    "I'm sorry, I wasn't able to finish working on that request. Could you try \
     asking again, maybe in a simpler form?";

/// One dispatched tool result, in issue order.
struct DispatchResult {
    content: String,
    is_error: bool,
    /// False when the request id had already been invoked in an earlier pass.
    invoked: bool,
}

/// The turn orchestrator: reasoning loop, tool dispatch, and history upkeep.
pub struct Agent {
    /// Reasoning backend for completions.
    backend: SharedBackend,
    /// The fixed tool catalog.
    tools: Arc<ToolRegistry>,
    /// Runtime configuration.
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent with the given backend and tools.
    pub fn new(backend: SharedBackend, tools: ToolRegistry, config: AgentConfig) -> Self {
        Self {
            backend,
            tools: Arc::new(tools),
            config,
        }
    }

    /// Get the agent configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Get the tool registry.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Execute a single conversational turn.
    ///
    /// Appends the user turn, runs the reasoning/tool-dispatch cycle, and
    /// appends the final assistant turn. Tool-level failures are folded into
    /// history and handed back to the engine; a reasoning-engine failure is
    /// fatal to the turn and returned as an error.
    pub async fn turn(&self, session: &mut Session, utterance: &str) -> Result<TurnOutcome> {
        let session_id = session.id.clone();
        session.append(Turn::user(utterance));

        tracing::info!(
            session_id = %session_id,
            utterance_len = utterance.len(),
            "Turn started"
        );

        let mut iterations = 0u32;
        let mut usage = TurnUsage::default();
        let mut dispatched_ids: HashSet<String> = HashSet::new();
        let mut total_tool_calls = 0usize;

        loop {
            iterations += 1;

            if iterations > self.config.max_iterations {
                tracing::warn!(
                    session_id = %session_id,
                    iterations = iterations - 1,
                    "Iteration cap reached, degrading reply"
                );
                session.append(Turn::assistant(CAP_EXHAUSTED_REPLY));
                session.set_topic(utterance);
                return Ok(TurnOutcome {
                    reply: CAP_EXHAUSTED_REPLY.to_string(),
                    iterations: iterations - 1,
                    tool_calls: total_tool_calls,
                    truncated: true,
                    usage,
                });
            }

            let request = self.build_request(session);

            tracing::debug!(
                session_id = %session_id,
                iteration = iterations,
                messages = request.messages.len(),
                tools = request.tools.len(),
                "Calling reasoning engine"
            );

            let started = Instant::now();
            let response =
                match timeout(self.config.reasoning_timeout, self.backend.complete(request)).await
                {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        tracing::error!(
                            session_id = %session_id,
                            iteration = iterations,
                            error = %e,
                            "Reasoning call failed"
                        );
                        return Err(AgentError::Reasoning(e));
                    }
                    Err(_) => {
                        tracing::error!(
                            session_id = %session_id,
                            iteration = iterations,
                            "Reasoning call timed out"
                        );
                        return Err(AgentError::Reasoning(LlmError::Timeout(
                            self.config.reasoning_timeout,
                        )));
                    }
                };
            let duration_ms = started.elapsed().as_millis() as u64;

            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            tracing::debug!(
                session_id = %session_id,
                iteration = iterations,
                has_tool_use = response.has_tool_use(),
                duration_ms,
                "Reasoning response received"
            );

            if response.has_tool_use() {
                let requests = collapse_duplicates(response.tool_uses());

                tracing::info!(
                    session_id = %session_id,
                    iteration = iterations,
                    tool_count = requests.len(),
                    tools = %requests.iter().map(|r| r.tool_name.as_str()).collect::<Vec<_>>().join(", "),
                    "Dispatching tools"
                );

                session.append(Turn::assistant_with_calls(
                    response.text(),
                    requests.clone(),
                ));

                let results = self.dispatch_tools(&requests, &mut dispatched_ids).await;

                // All calls complete before the next reasoning pass; results
                // land in history in the order the engine issued them.
                for (request, result) in requests.iter().zip(results) {
                    if result.invoked {
                        total_tool_calls += 1;
                    }
                    session.append(Turn::tool(
                        &request.request_id,
                        &request.tool_name,
                        result.content,
                        result.is_error,
                    ));
                }

                continue;
            }

            let reply = response.text();
            if reply.trim().is_empty() {
                return Err(AgentError::Reasoning(LlmError::MalformedOutput(
                    "completion had neither text nor tool calls".to_string(),
                )));
            }

            session.append(Turn::assistant(reply.clone()));
            // Topic policy: the triggering utterance most directly reflects
            // user intent, so it seeds the suggestion engine.
            session.set_topic(utterance);

            tracing::info!(
                session_id = %session_id,
                iterations,
                tool_calls = total_tool_calls,
                reply_len = reply.len(),
                "Turn completed"
            );

            return Ok(TurnOutcome {
                reply,
                iterations,
                tool_calls: total_tool_calls,
                truncated: false,
                usage,
            });
        }
    }

    /// Dispatch one pass of tool calls concurrently (fan-out), waiting for
    /// all of them (fan-in) before returning.
    async fn dispatch_tools(
        &self,
        requests: &[ToolCallRequest],
        dispatched: &mut HashSet<String>,
    ) -> Vec<DispatchResult> {
        let mut plans = Vec::with_capacity(requests.len());
        for request in requests {
            let fresh = dispatched.insert(request.request_id.clone());
            plans.push((request.clone(), fresh));
        }

        let futures = plans.into_iter().map(|(request, fresh)| {
            let tools = Arc::clone(&self.tools);
            let tool_timeout = self.config.tool_timeout;
            async move {
                if !fresh {
                    tracing::warn!(
                        request_id = %request.request_id,
                        tool = %request.tool_name,
                        "Request id already invoked this turn, refusing to re-issue"
                    );
                    return DispatchResult {
                        content: format!(
                            "Error: tool call request '{}' was already executed in this turn",
                            request.request_id
                        ),
                        is_error: true,
                        invoked: false,
                    };
                }

                let started = Instant::now();
                let (content, is_error) = match timeout(
                    tool_timeout,
                    tools.invoke(&request.tool_name, request.arguments.clone()),
                )
                .await
                {
                    Ok(Ok(output)) => (output.to_llm_content(), output.is_error()),
                    Ok(Err(e)) => {
                        tracing::warn!(
                            tool = %request.tool_name,
                            request_id = %request.request_id,
                            error = %e,
                            "Tool invocation failed"
                        );
                        (format!("Error: {e}"), true)
                    }
                    Err(_) => {
                        tracing::warn!(
                            tool = %request.tool_name,
                            request_id = %request.request_id,
                            "Tool invocation timed out"
                        );
                        (
                            format!("Error: tool '{}' timed out", request.tool_name),
                            true,
                        )
                    }
                };

                tracing::debug!(
                    tool = %request.tool_name,
                    request_id = %request.request_id,
                    is_error,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Tool completed"
                );

                DispatchResult {
                    content,
                    is_error,
                    invoked: true,
                }
            }
        });

        join_all(futures).await
    }

    /// Build the completion request from the bounded session history.
    fn build_request(&self, session: &Session) -> CompletionRequest {
        let messages = self.build_messages(session);
        let system = self
            .config
            .system_prompt
            .clone()
            .unwrap_or_else(|| default_system_prompt(Utc::now().date_naive()));

        let mut request =
            CompletionRequest::new(&self.config.model, messages, self.config.max_tokens)
                .with_system(system);

        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        let catalog = self.tools.describe();
        if !catalog.is_empty() {
            request = request.with_tools(catalog);
        }

        request
    }

    /// Map the replay window onto reasoning-engine messages, grouping
    /// consecutive tool turns into one tool-results message.
    fn build_messages(&self, session: &Session) -> Vec<Message> {
        let mut messages = Vec::new();
        let mut pending_results: Vec<ToolResultBlock> = Vec::new();

        for turn in session.replay_window(self.config.history_window) {
            if let Turn::Tool {
                request_id,
                content,
                is_error,
                ..
            } = turn
            {
                pending_results.push(ToolResultBlock {
                    tool_use_id: request_id.clone(),
                    content: content.clone(),
                    is_error: *is_error,
                });
                continue;
            }

            if !pending_results.is_empty() {
                messages.push(Message::tool_results(std::mem::take(&mut pending_results)));
            }

            match turn {
                Turn::User { content, .. } => messages.push(Message::user(content)),
                Turn::Assistant {
                    content,
                    tool_calls,
                    ..
                } => {
                    if tool_calls.is_empty() {
                        messages.push(Message::assistant(content));
                    } else {
                        let mut blocks = Vec::new();
                        if !content.is_empty() {
                            blocks.push(ContentBlock::text(content));
                        }
                        for call in tool_calls {
                            blocks.push(ContentBlock::tool_use(
                                &call.request_id,
                                &call.tool_name,
                                call.arguments.clone(),
                            ));
                        }
                        messages.push(Message::assistant_blocks(blocks));
                    }
                }
                Turn::Tool { .. } => {}
            }
        }

        if !pending_results.is_empty() {
            messages.push(Message::tool_results(pending_results));
        }

        messages
    }
}

/// Collapse duplicate request ids within one reasoning pass, keeping the
/// first occurrence. Tool invocation is at-most-once per request id.
fn collapse_duplicates(uses: Vec<ToolUseBlock>) -> Vec<ToolCallRequest> {
    let mut seen = HashSet::new();
    let mut requests = Vec::with_capacity(uses.len());
    for use_block in uses {
        if !seen.insert(use_block.id.clone()) {
            tracing::warn!(
                request_id = %use_block.id,
                tool = %use_block.name,
                "Duplicate request id within one pass, collapsing"
            );
            continue;
        }
        requests.push(ToolCallRequest {
            request_id: use_block.id,
            tool_name: use_block.name,
            arguments: use_block.input,
        });
    }
    requests
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
