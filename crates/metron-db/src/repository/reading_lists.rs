//! Reading list repository. Visibility is applied in SQL for the index and by the
//! API layer for single lists.

use metron_common::models::{
    CreateReadingListRequest, METRON_USERNAME, ReadingList, ReadingListFilter, ReadingListItemRow,
    ReadingListListRow, ReadingListSpan, UpdateReadingListRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::contains_pattern;

const SELECT: &str = "SELECT rl.id, rl.user_id, u.username, rl.name, rl.slug, rl.description, \
    rl.is_private, rl.attribution_source, rl.attribution_url, rl.created_on, rl.modified \
    FROM reading_lists rl JOIN users u ON u.id = rl.user_id";

fn push_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    viewer_id: i64,
    is_staff: bool,
    filter: &ReadingListFilter,
) {
    qb.push(" AND (rl.is_private = FALSE OR rl.user_id = ")
        .push_bind(viewer_id)
        .push(" OR (")
        .push_bind(is_staff)
        .push(" AND u.username = ")
        .push_bind(METRON_USERNAME)
        .push("))");
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(" AND rl.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(user) = filter.user {
        qb.push(" AND rl.user_id = ").push_bind(user);
    }
    if let Some(username) = filter.username.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(" AND u.username ILIKE ").push_bind(contains_pattern(username));
    }
    if let Some(source) = filter.attribution_source {
        qb.push(" AND rl.attribution_source = ").push_bind(source.as_str());
    }
    if let Some(is_private) = filter.is_private {
        qb.push(" AND rl.is_private = ").push_bind(is_private);
    }
    if let Some(modified) = filter.modified_gt {
        qb.push(" AND rl.modified > ").push_bind(modified);
    }
}

/// Lists visible to `viewer_id`.
pub async fn list(
    pool: &PgPool,
    viewer_id: i64,
    is_staff: bool,
    filter: &ReadingListFilter,
    page: &PageRequest,
) -> Result<(Vec<ReadingListListRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::new(
        "SELECT COUNT(*) FROM reading_lists rl JOIN users u ON u.id = rl.user_id WHERE TRUE",
    );
    push_filters(&mut count, viewer_id, is_staff, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::new(
        "SELECT rl.id, rl.name, rl.slug, rl.user_id, u.username, rl.is_private, \
         rl.attribution_source, rl.modified, \
         (SELECT COUNT(*) FROM reading_list_items it WHERE it.reading_list_id = rl.id) AS issue_count \
         FROM reading_lists rl JOIN users u ON u.id = rl.user_id WHERE TRUE",
    );
    push_filters(&mut query, viewer_id, is_staff, filter);
    query
        .push(" ORDER BY rl.name, rl.attribution_source, rl.user_id, rl.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = query
        .build_query_as::<ReadingListListRow>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<ReadingList>, sqlx::Error> {
    sqlx::query_as::<_, ReadingList>(&format!("{SELECT} WHERE rl.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Item count and the first and last cover years on the list.
pub async fn span(pool: &PgPool, id: i64) -> Result<ReadingListSpan, sqlx::Error> {
    sqlx::query_as::<_, ReadingListSpan>(
        r#"
        SELECT COUNT(*) AS issue_count,
               MIN(EXTRACT(YEAR FROM i.cover_date))::INTEGER AS start_year,
               MAX(EXTRACT(YEAR FROM i.cover_date))::INTEGER AS end_year
        FROM reading_list_items it
        JOIN issues i ON i.id = it.issue_id
        WHERE it.reading_list_id = $1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Items in reading order.
pub async fn items(
    pool: &PgPool,
    id: i64,
    page: &PageRequest,
) -> Result<(Vec<ReadingListItemRow>, i64), sqlx::Error> {
    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reading_list_items WHERE reading_list_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;

    let rows = sqlx::query_as::<_, ReadingListItemRow>(
        r#"
        SELECT it.id, it."order", it.issue_type, i.id AS issue_id, i.number, i.cover_date,
               i.store_date, i.cv_id, i.gcd_id, i.modified,
               s.name AS series_name, s.volume AS series_volume, s.year_began AS series_year_began
        FROM reading_list_items it
        JOIN issues i ON i.id = it.issue_id
        JOIN series s ON s.id = i.series_id
        WHERE it.reading_list_id = $1
        ORDER BY it."order", it.id
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

pub async fn create(
    pool: &PgPool,
    req: &CreateReadingListRequest,
    slug: &str,
    user_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO reading_lists (user_id, name, slug, description, is_private,
                                   attribution_source, attribution_url)
        VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, FALSE), COALESCE($6, ''),
                COALESCE($7, ''))
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.is_private)
    .bind(req.attribution_source.map(|s| s.as_str()))
    .bind(&req.attribution_url)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateReadingListRequest,
    slug: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE reading_lists SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            is_private = COALESCE($5, is_private),
            attribution_source = COALESCE($6, attribution_source),
            attribution_url = COALESCE($7, attribution_url),
            modified = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(req.is_private)
    .bind(req.attribution_source.map(|s| s.as_str()))
    .bind(&req.attribution_url)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reading_lists WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Last used position and the issue ids already on the list.
pub async fn item_positions(pool: &PgPool, id: i64) -> Result<(Option<i32>, Vec<i64>), sqlx::Error> {
    let last: Option<i32> =
        sqlx::query_scalar(r#"SELECT MAX("order") FROM reading_list_items WHERE reading_list_id = $1"#)
            .bind(id)
            .fetch_one(pool)
            .await?;
    let on_list: Vec<i64> =
        sqlx::query_scalar("SELECT issue_id FROM reading_list_items WHERE reading_list_id = $1")
            .bind(id)
            .fetch_all(pool)
            .await?;
    Ok((last, on_list))
}

/// Append `(issue id, order)` pairs and bump the list's modified time.
pub async fn add_items(
    pool: &PgPool,
    id: i64,
    planned: &[(i64, i32)],
    issue_type: &str,
) -> Result<u64, sqlx::Error> {
    let (issue_ids, orders): (Vec<i64>, Vec<i32>) = planned.iter().copied().unzip();

    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        r#"
        INSERT INTO reading_list_items (reading_list_id, issue_id, "order", issue_type)
        SELECT $1, t.issue_id, t.ord, $4
        FROM UNNEST($2::BIGINT[], $3::INTEGER[]) AS t(issue_id, ord)
        ON CONFLICT (reading_list_id, issue_id) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(&issue_ids)
    .bind(&orders)
    .bind(issue_type)
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE reading_lists SET modified = NOW() WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected())
}

/// Remove an issue from the list. Positions of the remaining items are left as they are.
pub async fn remove_item(pool: &PgPool, id: i64, issue_id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM reading_list_items WHERE reading_list_id = $1 AND issue_id = $2")
        .bind(id)
        .bind(issue_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() > 0 {
        sqlx::query("UPDATE reading_lists SET modified = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(result.rows_affected() > 0)
}
