//! Publisher repository.

use metron_common::models::{
    CreatePublisherRequest, NameFilter, NamedListItem, Publisher, SeriesListRow,
    UpdatePublisherRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::PgPool;

pub async fn list(
    pool: &PgPool,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    super::list_named(pool, "publishers", filter, page).await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Publisher>, sqlx::Error> {
    sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreatePublisherRequest,
    slug: &str,
    user_id: i64,
) -> Result<Publisher, sqlx::Error> {
    sqlx::query_as::<_, Publisher>(
        r#"
        INSERT INTO publishers (name, slug, description, founded, country, cv_id, gcd_id, created_by, edited_by)
        VALUES ($1, $2, COALESCE($3, ''), $4, COALESCE($5, 'US'), $6, $7, $8, $8)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.founded)
    .bind(&req.country)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdatePublisherRequest,
    user_id: i64,
) -> Result<Option<Publisher>, sqlx::Error> {
    sqlx::query_as::<_, Publisher>(
        r#"
        UPDATE publishers SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            founded = COALESCE($5, founded),
            country = COALESCE($6, country),
            cv_id = COALESCE($7, cv_id),
            gcd_id = COALESCE($8, gcd_id),
            edited_by = $9,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(req.founded)
    .bind(&req.country)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn series_count(pool: &PgPool, id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM series WHERE publisher_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

/// Series of a publisher, sorted like the main series list.
pub async fn series_list(
    pool: &PgPool,
    id: i64,
    page: &PageRequest,
) -> Result<(Vec<SeriesListRow>, i64), sqlx::Error> {
    let total = series_count(pool, id).await?;
    let rows = sqlx::query_as::<_, SeriesListRow>(
        r#"
        SELECT s.id, s.name, s.volume, s.year_began, s.series_type_id, s.modified,
               (SELECT COUNT(*) FROM issues i WHERE i.series_id = s.id) AS issue_count
        FROM series s
        WHERE s.publisher_id = $1
        ORDER BY s.sort_name, s.year_began, s.volume, s.id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}
