//! HTTP routes for the conversational API.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Result, ServerError};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Request/Response Types
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for the chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The conversation's session id (transport-assigned).
    pub session_id: String,
    /// The user's message.
    pub message: String,
}

/// Response from the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The session id the turn ran against.
    pub session_id: String,
    /// The assistant's reply text.
    pub reply: String,
    /// Follow-up suggestions derived from the conversation topic.
    pub suggestions: Vec<String>,
}

/// Request body for the suggestions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionsRequest {
    /// Session whose topic should seed the query.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Explicit topic overriding the session topic.
    #[serde(default)]
    pub topic: Option<String>,
}

/// Response from the suggestions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    /// Ranked follow-up questions, most relevant first.
    pub suggestions: Vec<String>,
    /// Number of suggestions.
    pub count: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /health - liveness probe.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /api/v1/chat - run one conversational turn.
///
/// Returns the reply together with fresh follow-up suggestions so a client
/// can render both from one round trip.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("message is required".to_string()));
    }
    if request.session_id.trim().is_empty() {
        return Err(ServerError::BadRequest("session_id is required".to_string()));
    }

    let reply = state
        .service
        .handle_turn(&request.session_id, &request.message)
        .await;
    let suggestions = state
        .service
        .get_suggestions(&request.session_id, None)
        .await;

    Ok(Json(ChatResponse {
        session_id: request.session_id,
        reply,
        suggestions,
    }))
}

/// POST /api/v1/suggestions - fetch follow-up suggestions.
pub async fn suggestions_handler(
    State(state): State<AppState>,
    Json(request): Json<SuggestionsRequest>,
) -> Result<Json<SuggestionsResponse>> {
    let session_id = request.session_id.as_deref().unwrap_or("");
    let suggestions = state
        .service
        .get_suggestions(session_id, request.topic.as_deref())
        .await;

    let count = suggestions.len();
    Ok(Json(SuggestionsResponse { suggestions, count }))
}

/// DELETE /api/v1/sessions/{id} - clear a conversation.
///
/// Idempotent: deleting an unknown session still succeeds.
pub async fn clear_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Value> {
    let existed = state.service.clear_conversation(&session_id).await;
    Json(json!({ "status": "cleared", "existed": existed }))
}
