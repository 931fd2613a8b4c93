//! JSON request/response types.

pub mod chat;
pub mod health;

pub use chat::{ChatRequest, ChatResponse, MessagesResponse};
pub use health::{HealthResponse, ModelStatus, SessionStats};
