//! Imprint model: a label operating under a publisher (e.g. Vertigo under DC).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::NamedRef;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Imprint {
    pub id: i64,
    pub publisher_id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub founded: Option<i32>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateImprintRequest {
    pub publisher: i64,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded: Option<i32>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateImprintRequest {
    pub publisher: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded: Option<i32>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct ImprintResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub founded: Option<i32>,
    pub publisher: NamedRef,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
}

impl ImprintResponse {
    pub fn new(imprint: Imprint, publisher: NamedRef) -> Self {
        Self {
            id: imprint.id,
            name: imprint.name,
            slug: imprint.slug,
            description: imprint.description,
            founded: imprint.founded,
            publisher,
            cv_id: imprint.cv_id,
            gcd_id: imprint.gcd_id,
            modified: imprint.modified,
        }
    }
}
