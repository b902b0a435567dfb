//! Story arc model: a storyline running across several issues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoryArc {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArcRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArcRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}
