//! The chat page.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};

use crate::{conversation::ConversationState, cookie, render, state::AppState};

/// Render the visitor's conversation.
///
/// A visitor without a known session sees the empty page; the session is
/// only created by the first form or API submission.
pub async fn handle_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let conversation = match cookie::session_id(&headers) {
        Some(id) => state.sessions.get(id).await,
        None => None,
    };

    let html = match conversation {
        Some(conversation) => {
            let mut conversation = conversation.lock().await;
            let html = render::render_page(&conversation);
            conversation.feedback.take_acknowledgement();
            conversation.take_notices();
            html
        }
        None => render::render_page(&ConversationState::new()),
    };

    Html(html).into_response()
}
