//! Application state shared across handlers.

use std::sync::Arc;

use verbena_agent::ChatService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The conversational service.
    pub service: Arc<ChatService>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(service: ChatService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
