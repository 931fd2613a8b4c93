//! Health check response types.

use serde::Serialize;
use t5chat_runtime::LoadState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: ModelStatus,
    pub sessions: SessionStats,
}

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub name: String,
    pub device: String,
    /// `not_loaded`, `ready` or `failed`.
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelStatus {
    pub fn new(name: impl Into<String>, device: impl ToString, load: LoadState) -> Self {
        let (state, error) = match load {
            LoadState::NotLoaded => ("not_loaded", None),
            LoadState::Ready => ("ready", None),
            LoadState::Failed(msg) => ("failed", Some(msg)),
        };
        Self {
            name: name.into(),
            device: device.to_string(),
            state,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStats {
    pub active: usize,
    pub max_sessions: usize,
}
