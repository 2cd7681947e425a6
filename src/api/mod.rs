use anyhow::Context;
use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tower_sessions::{
    Expiry, MemoryStore, Session, SessionManagerLayer,
    cookie::{Key, SameSite},
};
use tracing::warn;

use crate::config::{Config, SecurityConfig};
use crate::models::User;
use crate::services::{AuthError, AuthService};
use crate::state::SharedState;

mod auth;
mod error;
pub mod flash;
mod forms;
mod observability;
mod pages;
mod system;
pub mod templates;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub session_key: Key,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.shared.auth
    }
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let session_key = session_key(&shared.config.security)?;

    Ok(Arc::new(AppState {
        shared,
        session_key,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle)
}

/// Signing key for the session cookie. Without a configured secret the key is
/// random, so sessions do not survive a restart.
fn session_key(security: &SecurityConfig) -> anyhow::Result<Key> {
    match &security.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .context("Session secret must be at least 64 bytes"),
        None => {
            warn!("SECRET_KEY is not set; using an ephemeral session signing key");
            Ok(Key::generate())
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
        .with_signed(state.session_key.clone());

    let account_routes = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/register", get(users::register_form))
        .route("/user/create", post(users::create_user))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/user/update/form", get(users::update_form))
        .route("/user/update", post(users::update_profile))
        .route(
            "/user/update_password/form",
            get(users::update_password_form),
        )
        .route("/user/update_password", post(users::update_password))
        .route("/forgot", get(pages::forgot))
        .layer(session_layer);

    Router::new()
        .merge(account_routes)
        .route("/health/live", get(system::health_live))
        .route("/health/ready", get(system::health_ready))
        .route("/metrics", get(observability::get_metrics))
        .fallback(pages::not_found)
        .with_state(state)
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

/// The signed-in user, recorded on the request span.
pub(crate) async fn current_user(
    state: &AppState,
    session: &Session,
) -> Result<Option<User>, ApiError> {
    let user = state.auth().current_user(session).await?;
    if let Some(user) = &user {
        tracing::Span::current().record("user_id", user.username.as_str());
    }
    Ok(user)
}

pub(crate) async fn page_context(
    session: &Session,
    user: Option<User>,
) -> Result<templates::PageContext, ApiError> {
    let flashes = flash::take(session).await?;
    Ok(templates::PageContext { flashes, user })
}

/// Flashes a user-correctable failure and redirects to `to`. Internal
/// failures become an error page instead.
pub(crate) async fn fail(
    session: &Session,
    err: AuthError,
    to: &str,
) -> Result<Redirect, ApiError> {
    if err.is_internal() {
        return Err(err.into());
    }

    flash::danger(session, err.to_string()).await?;
    Ok(Redirect::to(to))
}
