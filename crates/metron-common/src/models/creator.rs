//! Creator model: writers, artists, editors and so on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Creator {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub birth: Option<NaiveDate>,
    pub death: Option<NaiveDate>,
    pub alias: Vec<String>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_create_creator"))]
pub struct CreateCreatorRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    pub birth: Option<NaiveDate>,

    pub death: Option<NaiveDate>,

    #[serde(default)]
    pub alias: Vec<String>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCreatorRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    pub birth: Option<NaiveDate>,

    pub death: Option<NaiveDate>,

    pub alias: Option<Vec<String>>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

fn validate_create_creator(req: &CreateCreatorRequest) -> Result<(), ValidationError> {
    check_lifespan(req.birth, req.death)
}

pub fn check_lifespan(
    birth: Option<NaiveDate>,
    death: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (birth, death) {
        (Some(b), Some(d)) if d < b => Err(ValidationError::new("death")
            .with_message("Date of death cannot be before date of birth.".into())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn death_after_birth() {
        let b = NaiveDate::from_ymd_opt(1922, 12, 28);
        let d = NaiveDate::from_ymd_opt(2018, 11, 12);
        assert!(check_lifespan(b, d).is_ok());
        assert!(check_lifespan(d, b).is_err());
        assert!(check_lifespan(None, d).is_ok());
    }
}
