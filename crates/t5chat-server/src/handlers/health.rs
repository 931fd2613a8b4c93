//! Health check handler.

use axum::{extract::State, Json};

use crate::{
    models::{HealthResponse, ModelStatus, SessionStats},
    state::AppState,
};

/// Report model load state and session utilisation. Never triggers a load.
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: ModelStatus::new(
            state.models.model_name(),
            state.device,
            state.models.state(),
        ),
        sessions: SessionStats {
            active: state.sessions.active_count().await,
            max_sessions: state.sessions.max_sessions(),
        },
    })
}
