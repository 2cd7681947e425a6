//! One-shot messages carried in the session to the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::ApiError;
use crate::constants::session::FLASH_KEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Danger,
}

impl FlashCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

pub async fn push(
    session: &Session,
    category: FlashCategory,
    message: impl Into<String>,
) -> Result<(), ApiError> {
    let mut flashes = session
        .get::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default();

    flashes.push(Flash {
        category,
        message: message.into(),
    });

    session.insert(FLASH_KEY, flashes).await?;
    Ok(())
}

pub async fn success(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    push(session, FlashCategory::Success, message).await
}

pub async fn info(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    push(session, FlashCategory::Info, message).await
}

pub async fn danger(session: &Session, message: impl Into<String>) -> Result<(), ApiError> {
    push(session, FlashCategory::Danger, message).await
}

/// Removes and returns pending messages. Sessions without messages are left
/// unmodified.
pub async fn take(session: &Session) -> Result<Vec<Flash>, ApiError> {
    if session.get::<Vec<Flash>>(FLASH_KEY).await?.is_none() {
        return Ok(Vec::new());
    }

    Ok(session
        .remove::<Vec<Flash>>(FLASH_KEY)
        .await?
        .unwrap_or_default())
}
