//! Small shapes shared by several resources: id/name references, list rows, filters,
//! and the flash messages returned by guarded actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lightweight `{id, name}` reference to a related object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

/// Row shape used by every name-keyed list endpoint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NamedListItem {
    pub id: i64,
    pub name: String,
    pub modified: DateTime<Utc>,
}

/// Query parameters accepted by name-keyed list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameFilter {
    /// Case-insensitive "contains" match on the name.
    pub name: Option<String>,
    /// Only rows modified after this instant.
    pub modified_gt: Option<DateTime<Utc>>,
    /// Comic Vine id.
    pub cv_id: Option<i32>,
    /// Grand Comics Database id.
    pub gcd_id: Option<i32>,
    pub page: Option<u32>,
}

/// Severity of a [`FlashMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// User-facing message produced by an action such as reprint sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: MessageLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: MessageLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: MessageLevel::Error, text: text.into() }
    }
}

/// Body returned by guarded actions: whether anything was written, plus the messages.
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub applied: bool,
    pub messages: Vec<FlashMessage>,
}
