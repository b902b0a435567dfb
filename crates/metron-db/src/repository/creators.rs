//! Creator repository.

use metron_common::models::{
    CreateCreatorRequest, Creator, NameFilter, NamedListItem, UpdateCreatorRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    super::list_named(pool, "creators", filter, page).await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Creator>, sqlx::Error> {
    sqlx::query_as::<_, Creator>("SELECT * FROM creators WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateCreatorRequest,
    slug: &str,
    user_id: i64,
) -> Result<Creator, sqlx::Error> {
    sqlx::query_as::<_, Creator>(
        r#"
        INSERT INTO creators (name, slug, description, birth, death, alias, cv_id, gcd_id, created_by, edited_by)
        VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7, $8, $9, $9)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.birth)
    .bind(req.death)
    .bind(&req.alias)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateCreatorRequest,
    user_id: i64,
) -> Result<Option<Creator>, sqlx::Error> {
    sqlx::query_as::<_, Creator>(
        r#"
        UPDATE creators SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            birth = COALESCE($5, birth),
            death = COALESCE($6, death),
            alias = COALESCE($7, alias),
            cv_id = COALESCE($8, cv_id),
            gcd_id = COALESCE($9, gcd_id),
            edited_by = $10,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.birth)
    .bind(req.death)
    .bind(&req.alias)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
