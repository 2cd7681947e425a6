use axum::{
    extract::State,
    http::Uri,
    response::Html,
};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ApiError, AppState, current_user, page_context, templates};

/// GET /
pub async fn home(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let user = current_user(&state, &session).await?;
    let ctx = page_context(&session, user).await?;
    Ok(templates::home(&ctx))
}

/// GET /about
pub async fn about(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let user = current_user(&state, &session).await?;
    let ctx = page_context(&session, user).await?;
    Ok(templates::about(&ctx))
}

/// GET /forgot
///
/// Display only; password reset is not offered.
pub async fn forgot(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Html<String>, ApiError> {
    let user = current_user(&state, &session).await?;
    let ctx = page_context(&session, user).await?;
    Ok(templates::forgot_form(&ctx, state.config().limits.max_string_length))
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path())
}
