//! Variant cover repository.

use metron_common::models::{CreateVariantRequest, UpdateVariantRequest, Variant, VariantSummary};
use sqlx::PgPool;

/// Variants of an issue in the order they were added.
pub async fn for_issue(pool: &PgPool, issue_id: i64) -> Result<Vec<VariantSummary>, sqlx::Error> {
    sqlx::query_as::<_, VariantSummary>(
        "SELECT id, name, price, sku, upc, image FROM variants WHERE issue_id = $1 ORDER BY id",
    )
    .bind(issue_id)
    .fetch_all(pool)
    .await
}

pub async fn create(pool: &PgPool, req: &CreateVariantRequest, user_id: i64) -> Result<Variant, sqlx::Error> {
    sqlx::query_as::<_, Variant>(
        r#"
        INSERT INTO variants (issue_id, name, image, price, price_currency, sku, upc,
                              created_by, edited_by)
        VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), $4, COALESCE($5, 'USD'),
                COALESCE($6, ''), COALESCE($7, ''), $8, $8)
        RETURNING *
        "#,
    )
    .bind(req.issue)
    .bind(&req.name)
    .bind(&req.image)
    .bind(&req.price)
    .bind(&req.price_currency)
    .bind(&req.sku)
    .bind(&req.upc)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateVariantRequest,
    user_id: i64,
) -> Result<Option<Variant>, sqlx::Error> {
    sqlx::query_as::<_, Variant>(
        r#"
        UPDATE variants SET
            issue_id = COALESCE($2, issue_id),
            name = COALESCE($3, name),
            image = COALESCE($4, image),
            price = COALESCE($5, price),
            price_currency = COALESCE($6, price_currency),
            sku = COALESCE($7, sku),
            upc = COALESCE($8, upc),
            edited_by = $9,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.issue)
    .bind(&req.name)
    .bind(&req.image)
    .bind(&req.price)
    .bind(&req.price_currency)
    .bind(&req.sku)
    .bind(&req.upc)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
