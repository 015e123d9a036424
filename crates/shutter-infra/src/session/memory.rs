//! In-memory session store - single-process deployments and tests.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use shutter_core::ports::{SessionData, SessionError, SessionStore};

struct SessionEntry {
    /// JSON-encoded [`SessionData`], the same shape a networked backend would hold.
    payload: String,
    expires_at: Instant,
}

/// Session store using a HashMap behind an async RwLock.
///
/// Sessions are lost on process restart.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn is_expired(entry: &SessionEntry) -> bool {
        Instant::now() > entry.expires_at
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !Self::is_expired(entry));
        before - sessions.len()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        let sessions = self.sessions.read().await;
        let Some(entry) = sessions.get(session_id) else {
            return Ok(None);
        };

        if Self::is_expired(entry) {
            drop(sessions);
            self.sessions.write().await.remove(session_id);
            return Ok(None);
        }

        serde_json::from_str(&entry.payload)
            .map(Some)
            .map_err(|e| SessionError::Serialization(e.to_string()))
    }

    async fn save(
        &self,
        session_id: &str,
        data: &SessionData,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let payload =
            serde_json::to_string(data).map_err(|e| SessionError::Serialization(e.to_string()))?;

        self.sessions.write().await.insert(
            session_id.to_string(),
            SessionEntry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );

        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> Result<(), SessionError> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
