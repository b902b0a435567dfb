//! Universe model: a publisher's continuity (e.g. Earth 616, Earth-Two).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::NamedRef;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Universe {
    pub id: i64,
    pub publisher_id: i64,
    pub name: String,
    pub slug: String,
    pub designation: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniverseFilter {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub modified_gt: Option<DateTime<Utc>>,
    pub gcd_id: Option<i32>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUniverseRequest {
    pub publisher: i64,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[validate(length(max = 255))]
    pub designation: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUniverseRequest {
    pub publisher: Option<i64>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[validate(length(max = 255))]
    pub designation: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UniverseResponse {
    pub id: i64,
    pub publisher: NamedRef,
    pub name: String,
    pub slug: String,
    pub designation: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
}

impl UniverseResponse {
    pub fn new(universe: Universe, publisher: NamedRef) -> Self {
        Self {
            id: universe.id,
            publisher,
            name: universe.name,
            slug: universe.slug,
            designation: universe.designation,
            description: universe.description,
            gcd_id: universe.gcd_id,
            modified: universe.modified,
        }
    }
}
