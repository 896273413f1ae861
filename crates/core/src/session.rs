//! In-memory session store.
//!
//! Maps a session id to that session's conversation. A session is created
//! when a chat connection opens and evicted when it closes; nothing survives
//! a restart. Each conversation sits behind its own mutex, and a turn holds
//! that mutex from the user message until the assistant reply is appended,
//! so turns within one session never overlap while separate sessions run
//! independently.

use crate::error::SessionError;
use crate::message::{Conversation, ConversationId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Shared handle to one session's conversation.
pub type SessionHandle = Arc<Mutex<Conversation>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<ConversationId, SessionHandle>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
        }
    }

    /// Open a new, empty session under a fresh id.
    pub async fn create(&self) -> Result<(ConversationId, SessionHandle), SessionError> {
        let id = ConversationId::new();
        let handle = self.open(id.clone()).await?;
        Ok((id, handle))
    }

    /// Open a session under a caller-chosen id, or return the live one.
    pub async fn open(&self, id: ConversationId) -> Result<SessionHandle, SessionError> {
        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(&id) {
            return Ok(existing.clone());
        }
        if sessions.len() >= self.max_sessions {
            return Err(SessionError::CapacityReached {
                limit: self.max_sessions,
            });
        }

        let handle = Arc::new(Mutex::new(Conversation::with_id(id.clone())));
        sessions.insert(id.clone(), handle.clone());
        debug!(session_id = %id, active = sessions.len(), "Session created");
        Ok(handle)
    }

    pub async fn get(&self, id: &ConversationId) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session. Returns whether it existed.
    pub async fn evict(&self, id: &ConversationId) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(id).is_some();
        if removed {
            debug!(session_id = %id, active = sessions.len(), "Session evicted");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(1_000)
    }
}
