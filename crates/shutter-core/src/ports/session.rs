use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Values kept per browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Option<i32>,
    pub csrf_token: Option<String>,
    /// One-shot notice shown on the next rendered page.
    pub notice: Option<String>,
}

impl SessionData {
    /// Consume the pending notice, leaving the slot empty.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }
}

/// Session store - abstraction over session backends (in-memory, memcached, Redis).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session.
    async fn load(&self, session_id: &str) -> Result<Option<SessionData>, SessionError>;

    /// Create or overwrite a session with the given lifetime.
    async fn save(
        &self,
        session_id: &str,
        data: &SessionData,
        ttl: Duration,
    ) -> Result<(), SessionError>;

    /// Drop a session.
    async fn destroy(&self, session_id: &str) -> Result<(), SessionError>;
}

/// Session operation errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}
