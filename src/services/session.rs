//! The per-client identity bag handed to every authentication call.

use async_trait::async_trait;
use std::sync::Mutex;
use tower_sessions::Session;

use crate::constants::session::IDENTITY_KEY;
use crate::services::auth_service::AuthError;

/// Holds at most one identity claim (a username) for one client.
#[async_trait]
pub trait SessionContext: Send + Sync {
    async fn identity(&self) -> Result<Option<String>, AuthError>;

    async fn set_identity(&self, username: &str) -> Result<(), AuthError>;

    /// Drops everything in the bag, not only the identity.
    async fn clear(&self) -> Result<(), AuthError>;
}

#[async_trait]
impl SessionContext for Session {
    async fn identity(&self) -> Result<Option<String>, AuthError> {
        self.get::<String>(IDENTITY_KEY)
            .await
            .map_err(|e| AuthError::Session(e.to_string()))
    }

    async fn set_identity(&self, username: &str) -> Result<(), AuthError> {
        self.insert(IDENTITY_KEY, username)
            .await
            .map_err(|e| AuthError::Session(e.to_string()))
    }

    async fn clear(&self) -> Result<(), AuthError> {
        Self::clear(self).await;
        Ok(())
    }
}

/// Process-local session used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MemorySession {
    identity: Mutex<Option<String>>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_identity(username: impl Into<String>) -> Self {
        Self {
            identity: Mutex::new(Some(username.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, AuthError> {
        self.identity
            .lock()
            .map_err(|_| AuthError::Session("session lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionContext for MemorySession {
    async fn identity(&self) -> Result<Option<String>, AuthError> {
        Ok(self.lock()?.clone())
    }

    async fn set_identity(&self, username: &str) -> Result<(), AuthError> {
        *self.lock()? = Some(username.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_session_lifecycle() {
        let session = MemorySession::new();
        assert_eq!(session.identity().await.unwrap(), None);

        session.set_identity("alice").await.unwrap();
        assert_eq!(session.identity().await.unwrap().as_deref(), Some("alice"));

        session.set_identity("bob").await.unwrap();
        assert_eq!(session.identity().await.unwrap().as_deref(), Some("bob"));

        session.clear().await.unwrap();
        assert_eq!(session.identity().await.unwrap(), None);
    }
}
