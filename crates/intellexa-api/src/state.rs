//! Application state shared across all route handlers.
//!
//! AppState holds the conversation controller (and through it the session
//! registry) plus shared resources. It is passed to handlers via axum's
//! State extractor.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use intellexa_core::config::AssistantConfig;
use intellexa_engine::{ConversationController, SessionRegistry};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Mutex<AssistantConfig>>,
    /// Turn orchestration; owns the registry.
    pub controller: Arc<ConversationController>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState around a wired-up controller.
    pub fn new(config: AssistantConfig, controller: Arc<ConversationController>) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            controller,
            start_time: Instant::now(),
        }
    }

    /// The registry backing the controller, for read-side handlers.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        self.controller.registry()
    }
}
