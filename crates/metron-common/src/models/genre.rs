//! Genre model: a seeded lookup list attached to series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub modified: DateTime<Utc>,
}
