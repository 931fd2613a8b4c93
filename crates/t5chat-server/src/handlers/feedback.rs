//! Rating control handlers.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;

use crate::{cookie, error::ServerError, feedback::Rating, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RatingForm {
    pub rating: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub feedback: String,
}

/// `POST /feedback/rating`: change the selected rating.
pub async fn handle_rating(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RatingForm>,
) -> Result<Response, ServerError> {
    let rating = form
        .rating
        .parse::<Rating>()
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;

    let session = state.sessions.resolve(cookie::session_id(&headers)).await?;
    session.conversation.lock().await.feedback.select(rating);
    Ok(super::with_session(&session, Redirect::to("/")))
}

/// `POST /feedback`: submit written feedback. Ignored unless the rating is Poor.
pub async fn handle_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, ServerError> {
    let session = state.sessions.resolve(cookie::session_id(&headers)).await?;
    let accepted = session
        .conversation
        .lock()
        .await
        .feedback
        .submit(&form.feedback);
    if !accepted {
        tracing::debug!(session = %session.id, "feedback ignored: rating is not Poor");
    }
    Ok(super::with_session(&session, Redirect::to("/")))
}
