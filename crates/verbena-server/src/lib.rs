//! HTTP API server for Verbena.
//!
//! A thin transport over [`verbena_agent::ChatService`]:
//!
//! - `POST /api/v1/chat` - run a turn, returning reply + suggestions
//! - `POST /api/v1/suggestions` - fetch follow-up suggestions
//! - `DELETE /api/v1/sessions/{id}` - clear a conversation (idempotent)
//! - `GET /health` - liveness probe
//!
//! No wire format beyond this REST mapping is imposed by the core; the
//! server simply forwards to the service's three entry points.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{Result, ServerError};
pub use routes::{ChatRequest, ChatResponse, SuggestionsRequest, SuggestionsResponse};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{delete, get, post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use verbena_agent::ChatService;

/// The Verbena HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server over the given service.
    pub fn new(service: ChatService) -> Self {
        Self {
            state: AppState::new(service),
        }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(routes::health_handler))
            .route("/api/v1/chat", post(routes::chat_handler))
            .route("/api/v1/suggestions", post(routes::suggestions_handler))
            .route(
                "/api/v1/sessions/{id}",
                delete(routes::clear_session_handler),
            )
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until the process is stopped.
    pub async fn run(self, addr: SocketAddr) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "Server listening");
        axum::serve(listener, self.router()).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
