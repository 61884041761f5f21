//! The conversational service facade.
//!
//! [`ChatService`] is what transports talk to. It owns the session store,
//! the turn orchestrator, and the suggestion engine, and exposes exactly
//! three operations: handle a turn, fetch suggestions, clear a conversation.

use std::time::Duration;

use verbena_suggest::SuggestionEngine;

use verbena_session::SessionStore;

use crate::agent::Agent;
use crate::types::Session;

/// Generic reply when the reasoning engine fails a turn.
///
/// The end user always receives natural-language text; internal error detail
/// goes to the log, never into the reply.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, something went wrong on my side. Please try again in a moment.";

/// The conversational orchestration surface exposed to transports.
pub struct ChatService {
    agent: Agent,
    store: SessionStore<Session>,
    suggester: SuggestionEngine,
}

impl ChatService {
    /// Create a new service.
    pub fn new(agent: Agent, store: SessionStore<Session>, suggester: SuggestionEngine) -> Self {
        Self {
            agent,
            store,
            suggester,
        }
    }

    /// Get the session store.
    pub fn store(&self) -> &SessionStore<Session> {
        &self.store
    }

    /// Handle one conversational turn and return the reply text.
    ///
    /// Creates the session on first contact. Turns against the same session
    /// are serialized by the session lock; distinct sessions proceed
    /// concurrently. Reasoning-engine failures degrade to a generic reply.
    pub async fn handle_turn(&self, session_id: &str, utterance: &str) -> String {
        let handle = self
            .store
            .get_or_create_with(session_id, || Session::new(session_id))
            .await;
        let mut session = handle.lock().await;

        match self.agent.turn(&mut session, utterance).await {
            Ok(outcome) => outcome.reply,
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    error = %e,
                    "Turn failed, returning fallback reply"
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }

    /// Ranked follow-up questions for a session.
    ///
    /// Uses `topic_hint` when given, otherwise the session's current topic.
    /// Returns an empty list when no topic is known or the similarity
    /// backend is unavailable; never an error.
    pub async fn get_suggestions(&self, session_id: &str, topic_hint: Option<&str>) -> Vec<String> {
        let topic = match topic_hint.map(str::trim).filter(|t| !t.is_empty()) {
            Some(hint) => hint.to_string(),
            None => match self.store.get(session_id).await {
                Ok(handle) => handle.lock().await.current_topic.clone(),
                Err(_) => String::new(),
            },
        };

        if topic.is_empty() {
            return Vec::new();
        }
        self.suggester.suggest(&topic).await
    }

    /// Discard a conversation entirely. Idempotent: clearing an unknown
    /// session succeeds and creates nothing.
    pub async fn clear_conversation(&self, session_id: &str) -> bool {
        self.store.remove(session_id).await
    }

    /// Evict sessions idle longer than `max_age`, returning their ids.
    pub async fn evict_idle(&self, max_age: Duration) -> Vec<String> {
        self.store.evict_idle(max_age).await
    }

    /// Spawn the configured idle-cleanup task, if any.
    pub fn spawn_cleanup_task(&self) -> Option<tokio::task::JoinHandle<()>> {
        self.store.spawn_cleanup_task()
    }

    /// A snapshot of a session's state, if it exists. For diagnostics and
    /// tests; the live session may move on after the clone.
    pub async fn session_snapshot(&self, session_id: &str) -> Option<Session> {
        match self.store.get(session_id).await {
            Ok(handle) => Some(handle.lock().await.clone()),
            Err(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolRegistry;
    use crate::tools::default_registry;
    use crate::types::AgentConfig;
    use std::sync::Arc;
    use verbena_llm::{CompletionResponse, ContentBlock, MockBackend, StopReason, Usage};
    use verbena_salon::{BeautyAdvisor, InMemorySalon};
    use verbena_session::StoreConfig;
    use verbena_suggest::{InMemoryIndex, SuggestConfig};

    fn service_with(backend: Arc<MockBackend>) -> ChatService {
        let index = Arc::new(InMemoryIndex::with_default_questions());
        let registry = default_registry(
            Arc::new(InMemorySalon::new()),
            index.clone(),
            BeautyAdvisor::new(),
        )
        .unwrap();
        ChatService::new(
            Agent::new(backend, registry, AgentConfig::default()),
            SessionStore::new(StoreConfig::default()),
            SuggestionEngine::new(index, SuggestConfig::default()),
        )
    }

    fn empty_tool_service(backend: Arc<MockBackend>) -> ChatService {
        let index = Arc::new(InMemoryIndex::with_default_questions());
        ChatService::new(
            Agent::new(backend, ToolRegistry::new(), AgentConfig::default()),
            SessionStore::new(StoreConfig::default()),
            SuggestionEngine::new(index, SuggestConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_haircut_turn_then_suggestions() {
        let backend = Arc::new(MockBackend::new(vec![
            CompletionResponse::new(
                "msg_1",
                "test-model",
                vec![ContentBlock::tool_use(
                    "call_1",
                    "check_availability",
                    serde_json::json!({"service": "haircut", "date": "tomorrow"}),
                )],
                StopReason::ToolUse,
                Usage::new(10, 5),
            ),
            CompletionResponse::text_reply("msg_2", "You can come at 10:00 or 14:30."),
        ]));
        let service = service_with(backend);

        let reply = service
            .handle_turn("ws-1", "What time can I get a haircut tomorrow?")
            .await;
        assert!(reply.contains("10:00"));

        // Topic was set from the utterance, so suggestions are non-empty
        // against the seeded index.
        let suggestions = service.get_suggestions("ws-1", None).await;
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= 5);
    }

    #[tokio::test]
    async fn test_reasoning_failure_degrades_to_fallback_reply() {
        let service = empty_tool_service(Arc::new(MockBackend::failing("engine down")));

        let reply = service.handle_turn("ws-1", "hello").await;
        assert_eq!(reply, FALLBACK_REPLY);

        // The user turn is still recorded.
        let snapshot = service.session_snapshot("ws-1").await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent_and_creates_nothing() {
        let service = empty_tool_service(Arc::new(MockBackend::with_text("hi")));

        assert!(!service.clear_conversation("never-seen").await);
        assert!(service.session_snapshot("never-seen").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_mid_session_resets_engine_context() {
        let backend = Arc::new(MockBackend::new(vec![
            CompletionResponse::text_reply("msg_1", "First reply."),
            CompletionResponse::text_reply("msg_2", "Fresh start."),
        ]));
        let service = empty_tool_service(backend.clone());

        service.handle_turn("ws-1", "remember this").await;
        assert!(service.clear_conversation("ws-1").await);

        service.handle_turn("ws-1", "new conversation").await;

        // The engine saw only the new user turn as context.
        let requests = backend.requests();
        let last = requests.last().unwrap();
        assert_eq!(last.messages.len(), 1);
        assert_eq!(last.messages[0].content.to_text(), "new conversation");
    }

    #[tokio::test]
    async fn test_suggestions_for_unknown_session_without_hint() {
        let service = empty_tool_service(Arc::new(MockBackend::with_text("hi")));
        assert!(service.get_suggestions("nope", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_with_topic_hint() {
        let service = empty_tool_service(Arc::new(MockBackend::with_text("hi")));
        let suggestions = service
            .get_suggestions("nope", Some("haircut tomorrow"))
            .await;
        assert!(!suggestions.is_empty());
    }
}
