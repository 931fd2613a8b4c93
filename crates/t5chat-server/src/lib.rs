//! # t5chat-server
//!
//! Serves the T5 chat bot to a browser: a server-rendered chat page with a
//! per-visitor conversation, a response-rating control, and a small JSON API
//! over the same sessions.
//!
//! Each visitor is identified by a session cookie. A turn locks that
//! visitor's conversation, runs a fresh [`t5chat_runtime::ChatGateway`] on
//! the blocking pool, and appends both sides of the exchange to a rolling
//! window of [`conversation::MAX_MESSAGES`] messages.

pub mod conversation;
pub mod cookie;
pub mod error;
pub mod feedback;
pub mod handlers;
pub mod models;
pub mod render;
pub mod server;
pub mod session_store;
pub mod state;
pub mod turn;

pub use conversation::{ConversationState, Message, Role, TurnPhase, MAX_MESSAGES};
pub use error::ServerError;
pub use feedback::{FeedbackState, Rating};
pub use server::{create_router, run_server};
pub use session_store::SessionStore;
pub use state::{AppState, ServerConfig};
