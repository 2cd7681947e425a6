use axum::{
    extract::{Form, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::forms::{PasswordForm, ProfileForm, RegisterForm};
use super::{ApiError, AppState, current_user, fail, flash, page_context, templates};
use crate::models::User;
use crate::services::AuthError;

/// GET /register
pub async fn register_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    if current_user(&state, &session).await?.is_some() {
        flash::info(&session, "You are already logged in!").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let ctx = page_context(&session, None).await?;
    let limits = &state.config().limits;
    Ok(templates::register_form(&ctx, limits.max_string_length, limits.max_password_length)
        .into_response())
}

/// POST /user/create
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, ApiError> {
    match state.auth().register(&session, form.as_input()).await {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.username.as_str());
            flash::success(&session, "Congratulations, you are now a registered user!").await?;
            Ok(Redirect::to("/login"))
        }
        Err(err) => fail(&session, err, "/register").await,
    }
}

/// GET /user/update/form
pub async fn update_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let Some(user) = signed_in(&state, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let ctx = page_context(&session, Some(user.clone())).await?;
    Ok(templates::profile_form(&ctx, &user, state.config().limits.max_string_length)
        .into_response())
}

/// POST /user/update
///
/// Every failure sends the user back to the login page.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, ApiError> {
    let Some(user) = signed_in(&state, &session).await? else {
        return Ok(Redirect::to("/login"));
    };

    match state.auth().update_profile(&user, form.as_update()).await {
        Ok(_) => {
            flash::success(&session, "Your profile was updated.").await?;
            Ok(Redirect::to("/"))
        }
        Err(AuthError::Unauthorized) => {
            flash::danger(&session, "Unauthorized action!").await?;
            Ok(Redirect::to("/login"))
        }
        Err(err) => fail(&session, err, "/login").await,
    }
}

/// GET /user/update_password/form
pub async fn update_password_form(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Response, ApiError> {
    let Some(user) = signed_in(&state, &session).await? else {
        return Ok(Redirect::to("/login").into_response());
    };

    let ctx = page_context(&session, Some(user)).await?;
    Ok(templates::password_form(&ctx, state.config().limits.max_password_length).into_response())
}

/// POST /user/update_password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<PasswordForm>,
) -> Result<Redirect, ApiError> {
    let Some(user) = signed_in(&state, &session).await? else {
        return Ok(Redirect::to("/login"));
    };

    match state
        .auth()
        .change_password(&user, form.new_password.as_deref(), form.verify.as_deref())
        .await
    {
        Ok(()) => {
            flash::success(&session, "Password successfully changed!").await?;
            Ok(Redirect::to("/"))
        }
        Err(err) => {
            let back = referrer_path(&headers);
            fail(&session, err, &back).await
        }
    }
}

/// Resolves the signed-in user, flashing a notice when there is none.
async fn signed_in(state: &AppState, session: &Session) -> Result<Option<User>, ApiError> {
    let user = current_user(state, session).await?;
    if user.is_none() {
        flash::danger(session, AuthError::NotLoggedIn.to_string()).await?;
    }
    Ok(user)
}

/// The same-origin path of the `Referer` header, or `/`.
fn referrer_path(headers: &HeaderMap) -> String {
    let Some(referer) = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
    else {
        return "/".to_string();
    };

    if is_local_path(referer) {
        return referer.to_string();
    }

    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    host.and_then(|host| {
        ["http://", "https://"].iter().find_map(|scheme| {
            referer
                .strip_prefix(scheme)
                .and_then(|rest| rest.strip_prefix(host))
                .filter(|path| is_local_path(path))
        })
    })
    .map_or_else(|| "/".to_string(), ToString::to_string)
}

/// Rooted paths only. Browsers read both `//` and `/\` as the start of
/// another origin.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(referer: Option<&'static str>, host: Option<&'static str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(r) = referer {
            map.insert(header::REFERER, HeaderValue::from_static(r));
        }
        if let Some(h) = host {
            map.insert(header::HOST, HeaderValue::from_static(h));
        }
        map
    }

    #[test]
    fn test_referrer_path() {
        assert_eq!(referrer_path(&headers(None, None)), "/");
        assert_eq!(
            referrer_path(&headers(Some("/user/update_password/form"), None)),
            "/user/update_password/form"
        );
        assert_eq!(
            referrer_path(&headers(
                Some("https://app.example.com/user/update_password/form"),
                Some("app.example.com")
            )),
            "/user/update_password/form"
        );
    }

    #[test]
    fn test_referrer_path_rejects_other_origins() {
        assert_eq!(
            referrer_path(&headers(Some("https://evil.example/phish"), Some("app.example.com"))),
            "/"
        );
        assert_eq!(referrer_path(&headers(Some("//evil.example/x"), None)), "/");
        assert_eq!(referrer_path(&headers(Some("/\\evil.example/x"), None)), "/");
        assert_eq!(
            referrer_path(&headers(
                Some("https://app.example.com/\\evil.example/x"),
                Some("app.example.com")
            )),
            "/"
        );
        assert_eq!(
            referrer_path(&headers(
                Some("https://app.example.com.evil.example/x"),
                Some("app.example.com")
            )),
            "/"
        );
    }
}
