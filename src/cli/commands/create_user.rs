//! Create user command handler

use anyhow::Context;
use std::io::{BufRead, Write};

use crate::config::Config;
use crate::services::{MemorySession, RegisterInput};
use crate::state::SharedState;

pub struct CreateUserArgs {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Option<String>,
}

pub async fn cmd_create_user(config: Config, args: CreateUserArgs) -> anyhow::Result<()> {
    let (password, confirm) = match args.password {
        Some(password) => (password.clone(), password),
        None => (prompt("Password: ")?, prompt("Repeat password: ")?),
    };

    let state = SharedState::new(config).await?;
    let input = RegisterInput {
        username: Some(args.username.as_str()),
        password: Some(password.as_str()),
        confirm: Some(confirm.as_str()),
        first_name: Some(args.first_name.as_str()),
        last_name: Some(args.last_name.as_str()),
        email: Some(args.email.as_str()),
    };

    let user = state
        .auth
        .register(&MemorySession::new(), input)
        .await
        .context("Failed to create user")?;

    println!("✓ Created user {} (id {})", user.username, user.id);
    Ok(())
}

fn prompt(label: &str) -> anyhow::Result<String> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    // Only the line terminator is dropped; passwords keep their whitespace.
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
