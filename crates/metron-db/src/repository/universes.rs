//! Universe repository.

use metron_common::models::{
    CreateUniverseRequest, NamedListItem, Universe, UniverseFilter, UpdateUniverseRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::contains_pattern;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &UniverseFilter) {
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(" AND u.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(designation) = filter.designation.as_deref().filter(|d| !d.trim().is_empty()) {
        qb.push(" AND u.designation ILIKE ")
            .push_bind(contains_pattern(designation));
    }
    if let Some(modified) = filter.modified_gt {
        qb.push(" AND u.modified > ").push_bind(modified);
    }
    if let Some(gcd_id) = filter.gcd_id {
        qb.push(" AND u.gcd_id = ").push_bind(gcd_id);
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &UniverseFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM universes u WHERE TRUE");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::new("SELECT u.id, u.name, u.modified FROM universes u WHERE TRUE");
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY u.name, u.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = query
        .build_query_as::<NamedListItem>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Universe>, sqlx::Error> {
    sqlx::query_as::<_, Universe>("SELECT * FROM universes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateUniverseRequest,
    slug: &str,
    user_id: i64,
) -> Result<Universe, sqlx::Error> {
    sqlx::query_as::<_, Universe>(
        r#"
        INSERT INTO universes (publisher_id, name, slug, designation, description, gcd_id, created_by, edited_by)
        VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, ''), $6, $7, $7)
        RETURNING *
        "#,
    )
    .bind(req.publisher)
    .bind(&req.name)
    .bind(slug)
    .bind(&req.designation)
    .bind(&req.description)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateUniverseRequest,
    user_id: i64,
) -> Result<Option<Universe>, sqlx::Error> {
    sqlx::query_as::<_, Universe>(
        r#"
        UPDATE universes SET
            publisher_id = COALESCE($2, publisher_id),
            name = COALESCE($3, name),
            slug = COALESCE($4, slug),
            designation = COALESCE($5, designation),
            description = COALESCE($6, description),
            gcd_id = COALESCE($7, gcd_id),
            edited_by = $8,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.publisher)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.designation)
    .bind(&req.description)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
