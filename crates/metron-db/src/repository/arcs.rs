//! Story arc repository.

use metron_common::models::{CreateArcRequest, NameFilter, NamedListItem, StoryArc, UpdateArcRequest};
use metron_common::pagination::PageRequest;
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    super::list_named(pool, "arcs", filter, page).await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<StoryArc>, sqlx::Error> {
    sqlx::query_as::<_, StoryArc>("SELECT * FROM arcs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateArcRequest,
    slug: &str,
    user_id: i64,
) -> Result<StoryArc, sqlx::Error> {
    sqlx::query_as::<_, StoryArc>(
        r#"
        INSERT INTO arcs (name, slug, description, cv_id, gcd_id, created_by, edited_by)
        VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $6)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateArcRequest,
    user_id: i64,
) -> Result<Option<StoryArc>, sqlx::Error> {
    sqlx::query_as::<_, StoryArc>(
        r#"
        UPDATE arcs SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            cv_id = COALESCE($5, cv_id),
            gcd_id = COALESCE($6, gcd_id),
            edited_by = $7,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
