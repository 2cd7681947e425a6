use axum::{
    extract::{Form, State},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::forms::LoginForm;
use super::{ApiError, AppState, current_user, fail, flash, page_context, templates};

/// GET /login
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    if current_user(&state, &session).await?.is_some() {
        flash::info(&session, "You are already logged in!").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let ctx = page_context(&session, None).await?;
    Ok(templates::login_form(&ctx).into_response())
}

/// POST /login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, ApiError> {
    match state
        .auth()
        .login(&session, form.username.as_deref(), form.password.as_deref())
        .await
    {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.username.as_str());
            flash::success(&session, format!("{} is now logged in!", user.username)).await?;
            Ok(Redirect::to("/"))
        }
        Err(err) => fail(&session, err, "/login").await,
    }
}

/// GET /logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Redirect, ApiError> {
    state.auth().logout(&session).await?;
    flash::success(&session, "Successfully logged out.").await?;
    Ok(Redirect::to("/login"))
}
