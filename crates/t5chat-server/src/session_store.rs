//! Conversation lookup by session cookie.
//!
//! Every session owns its own [`ConversationState`] behind an async mutex. A
//! turn holds that lock from start to finish, so one session never has two
//! turns in flight while different sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::conversation::ConversationState;
use crate::error::ServerError;

pub type SharedConversation = Arc<Mutex<ConversationState>>;

/// A session resolved for one request.
pub struct SessionHandle {
    pub id: Uuid,
    pub conversation: SharedConversation,
    /// True when the session was created by this request and the cookie
    /// still has to be issued.
    pub created: bool,
}

struct SessionEntry {
    conversation: SharedConversation,
    last_seen: Instant,
}

impl SessionEntry {
    /// No request holds the conversation besides the store.
    fn is_idle(&self) -> bool {
        Arc::strong_count(&self.conversation) == 1
    }
}

/// Live sessions, capped at a fixed count.
///
/// When the store is full, a new session replaces the least recently seen
/// idle one.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
        })
    }

    /// Existing session for `id`, without creating one.
    pub async fn get(&self, id: Uuid) -> Option<SharedConversation> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Instant::now();
        Some(Arc::clone(&entry.conversation))
    }

    /// The session named by the request's cookie, or a new one when the
    /// cookie is absent or unknown.
    ///
    /// Fails with [`ServerError::ServiceUnavailable`] only when the store is
    /// full and every session is in use by a request.
    pub async fn resolve(&self, id: Option<Uuid>) -> Result<SessionHandle, ServerError> {
        let mut sessions = self.sessions.lock().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                entry.last_seen = Instant::now();
                return Ok(SessionHandle {
                    id,
                    conversation: Arc::clone(&entry.conversation),
                    created: false,
                });
            }
        }

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .filter(|(_, entry)| entry.is_idle())
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id);
            match oldest {
                Some(evicted) => {
                    sessions.remove(&evicted);
                    tracing::debug!(session = %evicted, "idle session evicted");
                }
                None => {
                    tracing::warn!(max_sessions = self.max_sessions, "session store full");
                    return Err(ServerError::ServiceUnavailable);
                }
            }
        }

        let id = Uuid::new_v4();
        let conversation = Arc::new(Mutex::new(ConversationState::new()));
        sessions.insert(
            id,
            SessionEntry {
                conversation: Arc::clone(&conversation),
                last_seen: Instant::now(),
            },
        );
        tracing::debug!(session = %id, active = sessions.len(), "session created");

        Ok(SessionHandle {
            id,
            conversation,
            created: true,
        })
    }

    /// Number of live sessions.
    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_creates_then_reuses() {
        let store = SessionStore::new(4);
        let first = store.resolve(None).await.unwrap();
        assert!(first.created);

        let again = store.resolve(Some(first.id)).await.unwrap();
        assert!(!again.created);
        assert_eq!(again.id, first.id);
        assert!(Arc::ptr_eq(&again.conversation, &first.conversation));
        assert_eq!(store.active_count().await, 1);
    }

    #[tokio::test]
    async fn unknown_id_gets_fresh_session() {
        let store = SessionStore::new(4);
        let stale = Uuid::new_v4();
        let handle = store.resolve(Some(stale)).await.unwrap();
        assert!(handle.created);
        assert_ne!(handle.id, stale);
        assert!(store.get(stale).await.is_none());
    }

    #[tokio::test]
    async fn full_store_evicts_least_recent_idle_session() {
        let store = SessionStore::new(2);
        let a = store.resolve(None).await.unwrap().id;
        let b = store.resolve(None).await.unwrap().id;
        // Touch `a` so `b` is the least recently seen.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert!(store.get(a).await.is_some());

        let c = store.resolve(None).await.unwrap();
        assert!(c.created);
        assert_eq!(store.active_count().await, 2);
        assert!(store.get(a).await.is_some());
        assert!(store.get(b).await.is_none());
    }

    #[tokio::test]
    async fn full_store_of_busy_sessions_rejects() {
        let store = SessionStore::new(2);
        let a = store.resolve(None).await.unwrap();
        let b = store.resolve(None).await.unwrap();

        assert!(matches!(
            store.resolve(None).await,
            Err(ServerError::ServiceUnavailable)
        ));
        // Existing sessions stay reachable.
        assert!(store.resolve(Some(a.id)).await.is_ok());

        drop(b);
        assert!(store.resolve(None).await.unwrap().created);
        assert!(store.get(a.id).await.is_some());
        assert_eq!(store.max_sessions(), 2);
    }
}
