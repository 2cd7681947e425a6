//! `SeaORM` implementation of the `CredentialStore` trait.

use async_trait::async_trait;
use sea_orm::{DbErr, SqlErr};

use crate::db::Store;
use crate::models::{NewUser, User};
use crate::services::auth_service::AuthError;
use crate::services::credential_store::CredentialStore;

pub struct SeaOrmCredentialStore {
    store: Store,
}

impl SeaOrmCredentialStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn database_error(err: &anyhow::Error) -> AuthError {
    AuthError::Database(format!("{err:#}"))
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DbErr>().and_then(DbErr::sql_err),
        Some(SqlErr::UniqueConstraintViolation(_))
    )
}

fn create_error(err: &anyhow::Error, username: String) -> AuthError {
    if is_unique_violation(err) {
        AuthError::DuplicateUsername(username)
    } else {
        database_error(err)
    }
}

#[async_trait]
impl CredentialStore for SeaOrmCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.store
            .get_user_by_username(username)
            .await
            .map_err(|e| database_error(&e))
    }

    async fn create(&self, user: NewUser) -> Result<User, AuthError> {
        let username = user.username.clone();

        if self.find_by_username(&username).await?.is_some() {
            return Err(AuthError::DuplicateUsername(username));
        }

        // A concurrent registration can still win the race; the unique index
        // catches it.
        self.store
            .create_user(user)
            .await
            .map_err(|e| create_error(&e, username))
    }

    async fn save(&self, user: &User) -> Result<(), AuthError> {
        self.store
            .update_user(user)
            .await
            .map(|_| ())
            .map_err(|e| database_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unique_index_violation_maps_to_duplicate() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.create_user(new_user("alice")).await.unwrap();

        let err = store.create_user(new_user("alice")).await.unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(matches!(
            create_error(&err, "alice".to_string()),
            AuthError::DuplicateUsername(name) if name == "alice"
        ));
    }

    #[test]
    fn test_other_failures_map_to_database_error() {
        let err = anyhow::Error::new(DbErr::Custom("disk full".to_string()))
            .context("Failed to insert user");
        assert!(!is_unique_violation(&err));
        assert!(matches!(
            create_error(&err, "alice".to_string()),
            AuthError::Database(msg) if msg.contains("disk full")
        ));
    }

    #[tokio::test]
    async fn test_concurrent_registrations_yield_one_duplicate() {
        let path = std::env::temp_dir()
            .join(format!("userbase-race-{}.db", uuid::Uuid::new_v4()));
        let store = Store::new(&format!("sqlite:{}", path.display()))
            .await
            .unwrap();
        let credentials = SeaOrmCredentialStore::new(store);

        let (first, second) = tokio::join!(
            credentials.create(new_user("alice")),
            credentials.create(new_user("alice")),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(AuthError::DuplicateUsername(name)) if name == "alice")));

        let _ = std::fs::remove_file(&path);
    }
}
