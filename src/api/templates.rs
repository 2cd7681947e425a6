//! HTML for the account pages. Every interpolated value is escaped.

use axum::{http::StatusCode, response::Html};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::fmt::Write;

use super::flash::Flash;
use crate::models::User;

/// Data shared by every page: pending messages and the signed-in user.
pub struct PageContext {
    pub flashes: Vec<Flash>,
    pub user: Option<User>,
}

fn layout(title: &str, ctx: &PageContext, body: &str) -> Html<String> {
    let mut nav = String::from(r#"<a href="/">Home</a> <a href="/about">About</a>"#);
    match &ctx.user {
        Some(user) => {
            let _ = write!(
                nav,
                r#" <span class="user">{}</span> <a href="/user/update/form">Profile</a> <a href="/user/update_password/form">Password</a> <a href="/logout">Log out</a>"#,
                text(&user.username)
            );
        }
        None => nav.push_str(r#" <a href="/login">Log in</a> <a href="/register">Register</a>"#),
    }

    let mut messages = String::new();
    for flash in &ctx.flashes {
        let _ = write!(
            messages,
            r#"<div class="alert alert-{}">{}</div>"#,
            flash.category.as_str(),
            text(&flash.message)
        );
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body>
<nav>{nav}</nav>
<main>
{messages}
{body}
</main>
</body>
</html>
"#,
        title = text(title),
    ))
}

fn input(kind: &str, name: &str, label: &str, value: &str, max_len: Option<usize>) -> String {
    let max_attr = max_len.map_or_else(String::new, |n| format!(r#" maxlength="{n}""#));
    format!(
        r#"<label for="{name}">{label}</label>
<input type="{kind}" id="{name}" name="{name}" value="{value}"{max_attr} required>
"#,
        label = text(label),
        value = attr(value),
    )
}

pub fn home(ctx: &PageContext) -> Html<String> {
    let greeting = ctx.user.as_ref().map_or_else(
        || "<p>Register or log in to manage your account.</p>".to_string(),
        |user| format!("<p>Welcome back, {}!</p>", text(&user.first_name)),
    );
    layout("Home", ctx, &format!("<h1>Home</h1>\n{greeting}"))
}

pub fn about(ctx: &PageContext) -> Html<String> {
    layout(
        "About",
        ctx,
        "<h1>About</h1>\n<p>A basic user-account application.</p>",
    )
}

pub fn register_form(ctx: &PageContext, max_len: usize, max_password: usize) -> Html<String> {
    let mut body = String::from(
        "<h1>Register</h1>\n<form method=\"post\" action=\"/user/create\">\n",
    );
    body.push_str(&input("text", "username", "Username", "", Some(max_len)));
    body.push_str(&input("text", "first_name", "First Name", "", Some(max_len)));
    body.push_str(&input("text", "last_name", "Last Name", "", Some(max_len)));
    body.push_str(&input("email", "email", "Email", "", Some(max_len)));
    body.push_str(&input("password", "password", "Password", "", Some(max_password)));
    body.push_str(&input("password", "confirm", "Repeat Password", "", Some(max_password)));
    body.push_str("<button type=\"submit\">Register</button>\n</form>");
    layout("Register", ctx, &body)
}

pub fn login_form(ctx: &PageContext) -> Html<String> {
    let mut body = String::from("<h1>Log in</h1>\n<form method=\"post\" action=\"/login\">\n");
    body.push_str(&input("text", "username", "Username", "", None));
    body.push_str(&input("password", "password", "Password", "", None));
    body.push_str(
        "<button type=\"submit\">Log in</button>\n</form>\n<p><a href=\"/forgot\">Forgot your password?</a></p>",
    );
    layout("Log in", ctx, &body)
}

pub fn profile_form(ctx: &PageContext, user: &User, max_len: usize) -> Html<String> {
    let mut body = String::from(
        "<h1>Update profile</h1>\n<form method=\"post\" action=\"/user/update\">\n",
    );
    // The username cannot change; it is echoed back so the owner can be checked.
    let _ = write!(
        body,
        r#"<label for="username">Username</label>
<input type="text" id="username" name="username" value="{}" readonly>
"#,
        attr(&user.username)
    );
    body.push_str(&input("text", "first_name", "First Name", &user.first_name, Some(max_len)));
    body.push_str(&input("text", "last_name", "Last Name", &user.last_name, Some(max_len)));
    body.push_str(&input("email", "email", "Email", &user.email, Some(max_len)));
    body.push_str("<button type=\"submit\">Save</button>\n</form>");
    layout("Update profile", ctx, &body)
}

pub fn password_form(ctx: &PageContext, max_password: usize) -> Html<String> {
    let mut body = String::from(
        "<h1>Change password</h1>\n<form method=\"post\" action=\"/user/update_password\">\n",
    );
    body.push_str(&input("password", "new_password", "New Password", "", Some(max_password)));
    body.push_str(&input("password", "verify", "Repeat Password", "", Some(max_password)));
    body.push_str("<button type=\"submit\">Change password</button>\n</form>");
    layout("Change password", ctx, &body)
}

pub fn forgot_form(ctx: &PageContext, max_len: usize) -> Html<String> {
    let mut body = String::from("<h1>Forgot password</h1>\n<form method=\"get\" action=\"/forgot\">\n");
    body.push_str(&input("email", "email", "Email", "", Some(max_len)));
    body.push_str("<button type=\"submit\">Submit</button>\n</form>");
    layout("Forgot password", ctx, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> Html<String> {
    let ctx = PageContext {
        flashes: Vec::new(),
        user: None,
    };
    let body = format!(
        "<h1>{} {}</h1>\n<p>{}</p>",
        status.as_u16(),
        text(status.canonical_reason().unwrap_or("Error")),
        text(message)
    );
    layout("Error", &ctx, &body)
}
