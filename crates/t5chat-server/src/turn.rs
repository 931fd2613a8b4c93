//! Running a turn off the async runtime.

use t5chat_runtime::ChatGateway;
use tokio::task;

use crate::conversation::Message;
use crate::error::ServerError;
use crate::session_store::SharedConversation;
use crate::state::AppState;

/// What one turn left behind, read before the conversation lock is released.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// `None` when the input was blank and nothing ran.
    pub reply: Option<String>,
    pub notices: Vec<String>,
    pub messages: Vec<Message>,
}

/// Submit `input` to the conversation on the blocking pool.
///
/// The conversation lock is held for the whole turn. A fresh gateway is
/// built inside the task, so the first turn of the process also pays for the
/// model load there.
pub async fn run_turn(
    state: &AppState,
    conversation: SharedConversation,
    input: String,
) -> Result<TurnOutcome, ServerError> {
    let mut guard = conversation.lock_owned().await;
    let models = state.models.clone();
    let device = state.device;
    let seed = state.config.seed;

    task::spawn_blocking(move || {
        let reply = guard.submit(&input, || {
            let gateway = ChatGateway::new(&models, device);
            match seed {
                Some(seed) => gateway.with_seed(seed),
                None => gateway,
            }
        });
        TurnOutcome {
            reply,
            notices: guard.notices().to_vec(),
            messages: guard.messages().to_vec(),
        }
    })
    .await
    .map_err(|e| ServerError::Internal(format!("turn task failed: {e}")))
}
