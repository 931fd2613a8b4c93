//! Transcript handler.

use axum::{extract::State, http::HeaderMap, Json};

use crate::{cookie, models::MessagesResponse, state::AppState};

/// `GET /api/messages`: the caller's transcript, empty without a session.
pub async fn handle_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<MessagesResponse> {
    let messages = match cookie::session_id(&headers) {
        Some(id) => match state.sessions.get(id).await {
            Some(conversation) => conversation.lock().await.messages().to_vec(),
            None => Vec::new(),
        },
        None => Vec::new(),
    };
    Json(MessagesResponse { messages })
}
