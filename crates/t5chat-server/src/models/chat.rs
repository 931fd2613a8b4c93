//! Chat API request/response types.

use serde::{Deserialize, Serialize};

use crate::conversation::Message;

/// `POST /api/chat` body.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Result of one API turn.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// User-visible problems raised during the turn.
    pub notices: Vec<String>,
    /// Transcript after the turn.
    pub messages: Vec<Message>,
    /// Unix timestamp of the reply.
    pub created: i64,
}

/// `GET /api/messages` body.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}
