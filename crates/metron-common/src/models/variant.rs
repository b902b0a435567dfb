//! Variant covers of an issue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{validate_price, validate_sku, validate_upc};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Variant {
    pub id: i64,
    pub issue_id: i64,
    pub name: String,
    /// Stored cover path or URL.
    pub image: String,
    pub price: Option<String>,
    pub price_currency: String,
    pub sku: String,
    pub upc: String,
    pub created_by: Option<i64>,
    pub edited_by: Option<i64>,
    pub created_on: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Variant as listed on its issue.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VariantSummary {
    pub id: i64,
    pub name: String,
    pub price: Option<String>,
    pub sku: String,
    pub upc: String,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct VariantResponse {
    pub id: i64,
    pub issue: i64,
    pub name: String,
    pub image: String,
    pub price: Option<String>,
    pub price_currency: String,
    pub sku: String,
    pub upc: String,
    pub modified: DateTime<Utc>,
}

impl From<Variant> for VariantResponse {
    fn from(v: Variant) -> Self {
        Self {
            id: v.id,
            issue: v.issue_id,
            name: v.name,
            image: v.image,
            price: v.price,
            price_currency: v.price_currency,
            sku: v.sku,
            upc: v.upc,
            modified: v.modified,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVariantRequest {
    pub issue: i64,

    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub image: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<String>,

    #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
    pub price_currency: Option<String>,

    #[validate(length(max = 12), custom(function = "validate_sku"))]
    pub sku: Option<String>,

    #[validate(length(max = 20), custom(function = "validate_upc"))]
    pub upc: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVariantRequest {
    pub issue: Option<i64>,

    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub image: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<String>,

    #[validate(length(equal = 3, message = "Currency must be a three-letter code"))]
    pub price_currency: Option<String>,

    #[validate(length(max = 12), custom(function = "validate_sku"))]
    pub sku: Option<String>,

    #[validate(length(max = 20), custom(function = "validate_upc"))]
    pub upc: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_codes() {
        let body = serde_json::json!({
            "issue": 3,
            "name": "Ross Cover",
            "sku": "JUN-24",
            "upc": "7595",
            "price": "4.99"
        });
        let req: CreateVariantRequest = serde_json::from_value(body).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("sku"));
        assert!(!fields.contains_key("upc"));
        assert!(!fields.contains_key("price"));
    }
}
