//! Imprint repository.

use metron_common::models::{
    CreateImprintRequest, Imprint, NameFilter, NamedListItem, UpdateImprintRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    super::list_named(pool, "imprints", filter, page).await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Imprint>, sqlx::Error> {
    sqlx::query_as::<_, Imprint>("SELECT * FROM imprints WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateImprintRequest,
    slug: &str,
    user_id: i64,
) -> Result<Imprint, sqlx::Error> {
    sqlx::query_as::<_, Imprint>(
        r#"
        INSERT INTO imprints (publisher_id, name, slug, description, founded, cv_id, gcd_id, created_by, edited_by)
        VALUES ($1, $2, $3, COALESCE($4, ''), $5, $6, $7, $8, $8)
        RETURNING *
        "#,
    )
    .bind(req.publisher)
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.founded)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateImprintRequest,
    user_id: i64,
) -> Result<Option<Imprint>, sqlx::Error> {
    sqlx::query_as::<_, Imprint>(
        r#"
        UPDATE imprints SET
            publisher_id = COALESCE($2, publisher_id),
            name = COALESCE($3, name),
            slug = COALESCE($4, slug),
            description = COALESCE($5, description),
            founded = COALESCE($6, founded),
            cv_id = COALESCE($7, cv_id),
            gcd_id = COALESCE($8, gcd_id),
            edited_by = $9,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.publisher)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.founded)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
