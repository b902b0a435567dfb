//! Character model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::common::NamedRef;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub alias: Vec<String>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCharacterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    #[serde(default)]
    pub alias: Vec<String>,

    #[serde(default)]
    pub creators: Vec<i64>,
    #[serde(default)]
    pub teams: Vec<i64>,
    #[serde(default)]
    pub universes: Vec<i64>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCharacterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub slug: Option<String>,

    #[serde(rename = "desc")]
    pub description: Option<String>,

    pub alias: Option<Vec<String>>,

    pub creators: Option<Vec<i64>>,
    pub teams: Option<Vec<i64>>,
    pub universes: Option<Vec<i64>>,

    #[validate(range(min = 1))]
    pub cv_id: Option<i32>,

    #[validate(range(min = 1))]
    pub gcd_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CharacterResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub alias: Vec<String>,
    pub creators: Vec<NamedRef>,
    pub teams: Vec<NamedRef>,
    pub universes: Vec<NamedRef>,
    pub cv_id: Option<i32>,
    pub gcd_id: Option<i32>,
    pub modified: DateTime<Utc>,
}

impl CharacterResponse {
    pub fn new(
        character: Character,
        creators: Vec<NamedRef>,
        teams: Vec<NamedRef>,
        universes: Vec<NamedRef>,
    ) -> Self {
        Self {
            id: character.id,
            name: character.name,
            slug: character.slug,
            description: character.description,
            alias: character.alias,
            creators,
            teams,
            universes,
            cv_id: character.cv_id,
            gcd_id: character.gcd_id,
            modified: character.modified,
        }
    }
}
