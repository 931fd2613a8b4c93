//! Per-session conversation: the message log and the turn loop.

use serde::{Deserialize, Serialize};
use t5chat_engine::TokenId;
use t5chat_runtime::ResponseGenerator;

use crate::feedback::FeedbackState;

/// Most messages kept in a conversation; older ones are dropped.
pub const MAX_MESSAGES: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    #[default]
    Idle,
    Responding,
}

/// Everything a session remembers between requests.
#[derive(Debug, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    /// Reserved for model output of earlier turns; never read.
    #[allow(dead_code)]
    prior_output: Option<Vec<TokenId>>,
    phase: TurnPhase,
    notices: Vec<String>,
    pub feedback: FeedbackState,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Notices raised by the most recent turn, until they are taken.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Remove the notices once they have been shown.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// The rating control appears once the conversation has started.
    pub fn feedback_enabled(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Run one turn: record `input`, answer it with a gateway from
    /// `make_gateway`, record the answer.
    ///
    /// Blank input is ignored and returns `None`. Otherwise returns the
    /// reply, which is the fallback text when the gateway failed.
    pub fn submit<G, F>(&mut self, input: &str, make_gateway: F) -> Option<String>
    where
        G: ResponseGenerator,
        F: FnOnce() -> G,
    {
        if input.trim().is_empty() {
            return None;
        }

        self.notices.clear();
        self.feedback.take_acknowledgement();
        self.phase = TurnPhase::Responding;
        self.push(Message::user(input));
        tracing::debug!(messages = self.messages.len(), "turn started");

        let mut gateway = make_gateway();
        let reply = gateway.generate_response(input);
        self.notices.extend(gateway.take_notices());

        self.push(Message::assistant(reply.clone()));
        self.phase = TurnPhase::Idle;
        tracing::debug!(
            messages = self.messages.len(),
            notices = self.notices.len(),
            "turn finished"
        );
        Some(reply)
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            let excess = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the input back, optionally raising a notice.
    struct Echo {
        notice: Option<&'static str>,
    }

    impl ResponseGenerator for Echo {
        fn generate_response(&mut self, input: &str) -> String {
            format!("echo: {input}")
        }

        fn take_notices(&mut self) -> Vec<String> {
            self.notice.take().map(String::from).into_iter().collect()
        }
    }

    fn echo() -> Echo {
        Echo { notice: None }
    }

    #[test]
    fn hello_turn() {
        let mut state = ConversationState::new();
        let reply = state.submit("Hello", echo);
        assert_eq!(reply.as_deref(), Some("echo: Hello"));
        assert_eq!(
            state.messages(),
            &[Message::user("Hello"), Message::assistant("echo: Hello")]
        );
        assert_eq!(state.phase(), TurnPhase::Idle);
    }

    #[test]
    fn blank_input_ignored() {
        let mut state = ConversationState::new();
        assert!(state.submit("", echo).is_none());
        assert!(state.submit("   \n", echo).is_none());
        assert!(state.messages().is_empty());
        assert!(!state.feedback_enabled());
    }

    #[test]
    fn gateway_built_per_turn() {
        let mut state = ConversationState::new();
        let mut built = 0;
        for i in 0..3 {
            state.submit(&format!("m{i}"), || {
                built += 1;
                echo()
            });
        }
        assert_eq!(built, 3);
    }

    #[test]
    fn window_keeps_latest_fifty() {
        let mut state = ConversationState::new();
        for i in 0..30 {
            state.submit(&format!("message {i}"), echo);
        }
        let messages = state.messages();
        assert_eq!(messages.len(), MAX_MESSAGES);
        // 60 appended, the first 10 (turns 0..5) dropped.
        assert_eq!(messages[0], Message::user("message 5"));
        assert_eq!(messages[49], Message::assistant("echo: message 29"));
    }

    #[test]
    fn roles_alternate() {
        let mut state = ConversationState::new();
        for i in 0..40 {
            state.submit(&i.to_string(), echo);
        }
        for pair in state.messages().chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }

    #[test]
    fn notices_cover_latest_turn_only() {
        let mut state = ConversationState::new();
        state.submit("one", || Echo {
            notice: Some("An error occurred: boom"),
        });
        assert_eq!(state.notices(), &["An error occurred: boom".to_string()]);

        state.submit("two", echo);
        assert!(state.notices().is_empty());
    }

    #[test]
    fn notices_taken_once() {
        let mut state = ConversationState::new();
        state.submit("one", || Echo {
            notice: Some("Failed to load model: gone"),
        });
        assert_eq!(state.take_notices(), vec!["Failed to load model: gone".to_string()]);
        assert!(state.notices().is_empty());
        assert!(state.take_notices().is_empty());
        // The transcript is untouched.
        assert_eq!(state.messages().len(), 2);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
