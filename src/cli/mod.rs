//! CLI module - Command-line interface for userbase
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// userbase - user accounts web application
#[derive(Parser)]
#[command(name = "userbase")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    Init,

    /// Register a user account from the command line
    CreateUser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        /// Password; prompted on stdin when absent
        #[arg(long, env = "USERBASE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

pub use commands::*;
