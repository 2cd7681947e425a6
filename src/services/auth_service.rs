//! Domain service for registration, login and account maintenance.
//!
//! All session state flows through an explicit [`SessionContext`], so the
//! service never reaches for request-global state.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;
use tokio::task;
use tracing::{info, warn};

use crate::config::{LimitsConfig, SecurityConfig};
use crate::constants::labels;
use crate::models::{NewUser, User};
use crate::password::{PasswordPolicy, hash_password, verify_password_hash};
use crate::services::credential_store::CredentialStore;
use crate::services::session::SessionContext;
use crate::validation::{ValidationError, validate_string};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Same error for an unknown user and a wrong password.
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User with username \"{0}\" already exists")]
    DuplicateUsername(String),

    #[error("Unauthorized action")]
    Unauthorized,

    #[error("You are not logged in")]
    NotLoggedIn,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Failures the user cannot fix by resubmitting the form.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Session(_) | Self::Database(_) | Self::Internal(_)
        )
    }
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Whether a session carries a live identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated(User),
}

/// Raw registration fields as submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegisterInput<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub confirm: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// Raw profile fields as submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileUpdate<'a> {
    pub username: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    policy: PasswordPolicy,
    max_string_length: usize,
    security: SecurityConfig,
    /// Verifier checked when the username is unknown.
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        limits: &LimitsConfig,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            policy: PasswordPolicy::from(limits),
            max_string_length: limits.max_string_length,
            security,
            dummy_hash: OnceCell::new(),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> PasswordPolicy {
        self.policy
    }

    fn field(&self, value: Option<&str>, label: &'static str) -> Result<String, AuthError> {
        Ok(validate_string(value, label, self.max_string_length)?)
    }

    /// Creates an account and logs it in on `ctx`.
    pub async fn register(
        &self,
        ctx: &dyn SessionContext,
        input: RegisterInput<'_>,
    ) -> Result<User, AuthError> {
        let username = self.field(input.username, labels::USERNAME)?;
        let password = self.policy.verify_pair(input.password, input.confirm)?;
        let first_name = self.field(input.first_name, labels::FIRST_NAME)?;
        let last_name = self.field(input.last_name, labels::LAST_NAME)?;
        let email = self.field(input.email, labels::EMAIL)?;

        if self.store.find_by_username(&username).await?.is_some() {
            return Err(AuthError::DuplicateUsername(username));
        }

        let password_hash = self.hash(password).await?;
        let user = self
            .store
            .create(NewUser {
                username,
                first_name,
                last_name,
                email,
                password_hash,
            })
            .await?;

        ctx.set_identity(&user.username).await?;
        metrics::counter!("auth_registrations_total").increment(1);
        info!(user_id = user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Verifies credentials and stores the identity on success.
    ///
    /// The password is compared as submitted; the password policy is not
    /// applied here.
    pub async fn login(
        &self,
        ctx: &dyn SessionContext,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<User, AuthError> {
        let username = self.field(username, labels::USERNAME)?;
        let password = match password {
            None => {
                return Err(ValidationError::Missing {
                    label: labels::PASSWORD,
                }
                .into());
            }
            Some("") => {
                return Err(ValidationError::Empty {
                    label: labels::PASSWORD,
                }
                .into());
            }
            Some(p) => p.to_string(),
        };

        let Some(user) = self.store.find_by_username(&username).await? else {
            // Unknown users pay the same hashing cost as a wrong password.
            self.verify_against_dummy(password).await?;
            metrics::counter!("auth_login_total", "outcome" => "failure").increment(1);
            info!(username = %username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let password_hash = user.password_hash.clone();
        let is_valid = task::spawn_blocking(move || verify_password_hash(&password, &password_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))??;

        if !is_valid {
            metrics::counter!("auth_login_total", "outcome" => "failure").increment(1);
            info!(username = %username, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        ctx.set_identity(&user.username).await?;
        metrics::counter!("auth_login_total", "outcome" => "success").increment(1);
        info!(user_id = user.id, username = %user.username, "User logged in");

        Ok(user)
    }

    pub async fn logout(&self, ctx: &dyn SessionContext) -> Result<(), AuthError> {
        ctx.clear().await
    }

    /// Resolves the session identity to a stored user. Absent, empty, and
    /// stale identities all yield `None`.
    pub async fn current_user(&self, ctx: &dyn SessionContext) -> Result<Option<User>, AuthError> {
        let Some(username) = ctx.identity().await? else {
            return Ok(None);
        };

        if username.is_empty() {
            return Ok(None);
        }

        let user = self.store.find_by_username(&username).await?;
        if user.is_none() {
            warn!(username = %username, "Session refers to a missing user");
        }

        Ok(user)
    }

    pub async fn state(&self, ctx: &dyn SessionContext) -> Result<SessionState, AuthError> {
        Ok(self
            .current_user(ctx)
            .await?
            .map_or(SessionState::Anonymous, SessionState::Authenticated))
    }

    pub async fn require_user(&self, ctx: &dyn SessionContext) -> Result<User, AuthError> {
        self.current_user(ctx).await?.ok_or(AuthError::NotLoggedIn)
    }

    /// Sets a new password after checking it against the policy. The store is
    /// only written when the pair is valid.
    pub async fn change_password(
        &self,
        user: &User,
        new_password: Option<&str>,
        confirmation: Option<&str>,
    ) -> Result<(), AuthError> {
        let password = self.policy.verify_pair(new_password, confirmation)?;
        let password_hash = self.hash(password).await?;

        let mut updated = user.clone();
        updated.password_hash = password_hash;
        self.store.save(&updated).await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    /// Updates names and email. The submitted username must equal the
    /// owner's; anything else is rejected before other fields are looked at.
    pub async fn update_profile(
        &self,
        user: &User,
        update: ProfileUpdate<'_>,
    ) -> Result<User, AuthError> {
        if update.username.map(str::trim) != Some(user.username.as_str()) {
            warn!(user_id = user.id, "Rejected profile update for another identity");
            return Err(AuthError::Unauthorized);
        }

        let first_name = self.field(update.first_name, labels::FIRST_NAME)?;
        let last_name = self.field(update.last_name, labels::LAST_NAME)?;
        let email = self.field(update.email, labels::EMAIL)?;

        let mut updated = user.clone();
        updated.first_name = first_name;
        updated.last_name = last_name;
        updated.email = email;
        self.store.save(&updated).await?;

        info!(user_id = user.id, "Profile updated");
        Ok(updated)
    }

    async fn verify_against_dummy(&self, password: String) -> Result<(), AuthError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| self.hash("unknown-user-placeholder".to_string()))
            .await?
            .clone();

        task::spawn_blocking(move || verify_password_hash(&password, &dummy_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task panicked: {e}")))??;
        Ok(())
    }

    async fn hash(&self, password: String) -> Result<String, AuthError> {
        let config = self.security.clone();
        let hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .map_err(|e| AuthError::Internal(format!("Password hashing task panicked: {e}")))??;
        Ok(hash)
    }
}
