//! Keyed persistence for user records, as seen by the authenticator.

use async_trait::async_trait;

use crate::models::{NewUser, User};
use crate::services::auth_service::AuthError;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;

    /// Fails with [`AuthError::DuplicateUsername`] if the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, AuthError>;

    /// Persists the mutable fields of an existing user as one commit.
    async fn save(&self, user: &User) -> Result<(), AuthError>;
}

#[cfg(test)]
pub use memory::MemoryCredentialStore;

#[cfg(test)]
mod memory {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::CredentialStore;
    use crate::models::{NewUser, User};
    use crate::services::auth_service::AuthError;

    /// In-process store keyed by username.
    #[derive(Debug, Default)]
    pub struct MemoryCredentialStore {
        inner: Mutex<MemoryState>,
    }

    #[derive(Debug, Default)]
    struct MemoryState {
        next_id: i32,
        users: HashMap<String, User>,
        writes: usize,
    }

    impl MemoryCredentialStore {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of successful `create` and `save` calls.
        pub fn write_count(&self) -> usize {
            self.inner.lock().map_or(0, |state| state.writes)
        }

        fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, AuthError> {
            self.inner
                .lock()
                .map_err(|_| AuthError::Internal("credential store lock poisoned".to_string()))
        }
    }

    #[async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
            Ok(self.lock()?.users.get(username).cloned())
        }

        async fn create(&self, user: NewUser) -> Result<User, AuthError> {
            let mut state = self.lock()?;
            if state.users.contains_key(&user.username) {
                return Err(AuthError::DuplicateUsername(user.username));
            }

            state.next_id += 1;
            let now = chrono::Utc::now().to_rfc3339();
            let created = User {
                id: state.next_id,
                username: user.username,
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash: user.password_hash,
                created_at: now.clone(),
                updated_at: now,
            };

            state.users.insert(created.username.clone(), created.clone());
            state.writes += 1;
            Ok(created)
        }

        async fn save(&self, user: &User) -> Result<(), AuthError> {
            let mut state = self.lock()?;
            let existing = state
                .users
                .values_mut()
                .find(|u| u.id == user.id)
                .ok_or_else(|| AuthError::Database(format!("User {} not found", user.id)))?;

            // The username is immutable once created.
            existing.first_name.clone_from(&user.first_name);
            existing.last_name.clone_from(&user.last_name);
            existing.email.clone_from(&user.email);
            existing.password_hash.clone_from(&user.password_hash);
            existing.updated_at = chrono::Utc::now().to_rfc3339();
            state.writes += 1;
            Ok(())
        }
    }
}
