pub mod auth_service;
pub use auth_service::{AuthError, AuthService, ProfileUpdate, RegisterInput, SessionState};

pub mod credential_store;
pub mod credential_store_impl;
pub use credential_store::CredentialStore;
#[cfg(test)]
pub use credential_store::MemoryCredentialStore;
pub use credential_store_impl::SeaOrmCredentialStore;

pub mod session;
pub use session::{MemorySession, SessionContext};
