//! Application state and configuration.

use std::sync::Arc;

use t5chat_runtime::{Device, ModelCache};

use crate::session_store::SessionStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide model, loaded on the first turn.
    pub models: Arc<ModelCache>,
    /// Device every gateway places the model on.
    pub device: Device,
    /// Server configuration.
    pub config: ServerConfig,
    /// Conversations keyed by session cookie.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(models: ModelCache, device: Device, config: ServerConfig) -> Self {
        let sessions = SessionStore::new(config.max_sessions);
        Self {
            models: Arc::new(models),
            device,
            config,
            sessions,
        }
    }
}

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum number of live sessions.
    pub max_sessions: usize,
    /// Fixed sampling seed for every turn; random per turn when unset.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_sessions: 4096,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
