//! Chat turn handlers.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Redirect, Response},
    Form, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    cookie,
    error::ServerError,
    models::{ChatRequest, ChatResponse},
    state::AppState,
    turn::run_turn,
};

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    pub message: String,
}

/// `POST /chat`: run a turn from the page's input box, then show the page.
pub async fn handle_chat_form(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Result<Response, ServerError> {
    let session = state.sessions.resolve(cookie::session_id(&headers)).await?;
    run_turn(&state, session.conversation.clone(), form.message).await?;
    Ok(super::with_session(&session, Redirect::to("/")))
}

/// `POST /api/chat`: run a turn and return the reply with the transcript.
pub async fn handle_api_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Response, ServerError> {
    if req.message.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "message must not be empty".to_string(),
        ));
    }

    let session = state.sessions.resolve(cookie::session_id(&headers)).await?;
    let outcome = run_turn(&state, session.conversation.clone(), req.message).await?;
    let reply = outcome
        .reply
        .ok_or_else(|| ServerError::InvalidRequest("message must not be empty".to_string()))?;

    Ok(super::with_session(
        &session,
        Json(ChatResponse {
            reply,
            notices: outcome.notices,
            messages: outcome.messages,
            created: Utc::now().timestamp(),
        }),
    ))
}
