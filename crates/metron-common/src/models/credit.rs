//! Credits: a creator's roles on one issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::NamedRef;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    /// Display order within a credit list
    pub order: i32,
    pub notes: String,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Credit {
    pub id: i64,
    pub issue_id: i64,
    pub creator_id: i64,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Credit as shown on an issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRead {
    pub id: i64,
    pub creator: NamedRef,
    pub role: Vec<NamedRef>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCreditRequest {
    pub issue: i64,
    pub creator: i64,
    #[validate(length(min = 1, message = "A credit needs at least one role"))]
    pub role: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreditResponse {
    pub id: i64,
    pub issue: i64,
    pub creator: i64,
    pub role: Vec<i64>,
}
