//! Publisher model: the company that owns imprints, series and universes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A comic publisher (e.g. DC Comics, Marvel).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    /// Year founded
    pub founded: Option<i32>,
    /// ISO 3166-1 country code
    pub country: String,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePublisherRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded: Option<i32>,

    #[validate(length(equal = 2, message = "Country must be a two-letter code"))]
    pub country: Option<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePublisherRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[validate(range(min = 1800, max = 2100, message = "Founded year is out of range"))]
    pub founded: Option<i32>,

    #[validate(length(equal = 2, message = "Country must be a two-letter code"))]
    pub country: Option<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

/// Publisher detail with its series count.
#[derive(Debug, Serialize)]
pub struct PublisherResponse {
    #[serde(flatten)]
    pub publisher: Publisher,
    pub series_count: i64,
}
