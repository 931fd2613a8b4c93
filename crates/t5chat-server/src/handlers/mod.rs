//! HTTP request handlers.

pub mod chat;
pub mod feedback;
pub mod health;
pub mod messages;
pub mod page;

pub use chat::{handle_api_chat, handle_chat_form};
pub use feedback::{handle_feedback, handle_rating};
pub use health::handle_health;
pub use messages::handle_messages;
pub use page::handle_page;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::cookie;
use crate::session_store::SessionHandle;

/// Attach the session cookie when `session` was created by this request.
pub(crate) fn with_session(session: &SessionHandle, response: impl IntoResponse) -> Response {
    let mut response = response.into_response();
    if session.created {
        response
            .headers_mut()
            .append(header::SET_COOKIE, cookie::issue(session.id));
    }
    response
}
