//! Collection repository. Every query is scoped to the owning user.

use chrono::{DateTime, Utc};
use metron_common::models::{
    CollectionFilter, CollectionItem, CollectionListRow, CollectionStats, CreateCollectionItemRequest,
    FormatCount, IssueListRow, MissingSeriesRow, ReadDate, UpdateCollectionItemRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::contains_pattern;
use super::issues::LIST_SELECT;

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, user_id: i64, filter: &CollectionFilter) {
    qb.push(" AND c.user_id = ").push_bind(user_id);
    if let Some(format) = filter.book_format {
        qb.push(" AND c.book_format = ").push_bind(format.as_str());
    }
    for (op, date) in [
        ("=", filter.purchase_date),
        (">", filter.purchase_date_gt),
        ("<", filter.purchase_date_lt),
        (">=", filter.purchase_date_gte),
        ("<=", filter.purchase_date_lte),
    ] {
        if let Some(date) = date {
            qb.push(format!(" AND c.purchase_date {op} ")).push_bind(date);
        }
    }
    if let Some(store) = filter.purchase_store.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND c.purchase_store ILIKE ").push_bind(contains_pattern(store));
    }
    if let Some(location) = filter.storage_location.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND c.storage_location ILIKE ").push_bind(contains_pattern(location));
    }
    if let Some(series_id) = filter.series_id {
        qb.push(" AND i.series_id = ").push_bind(series_id);
    }
    if let Some(is_read) = filter.is_read {
        qb.push(" AND c.is_read = ").push_bind(is_read);
    }
    if let Some(rating) = filter.rating {
        qb.push(" AND c.rating = ").push_bind(rating);
    }
    if let Some(grade) = &filter.grade {
        qb.push(" AND c.grade = ").push_bind(grade.clone());
    }
    if let Some(company) = filter.grading_company {
        qb.push(" AND c.grading_company = ").push_bind(company.as_str());
    }
    if let Some(modified) = filter.modified_gt {
        qb.push(" AND c.modified > ").push_bind(modified);
    }
}

pub async fn list(
    pool: &PgPool,
    user_id: i64,
    filter: &CollectionFilter,
    page: &PageRequest,
) -> Result<(Vec<CollectionListRow>, i64), sqlx::Error> {
    let from = "FROM collection_items c \
        JOIN users u ON u.id = c.user_id \
        JOIN issues i ON i.id = c.issue_id \
        JOIN series s ON s.id = i.series_id WHERE TRUE";

    let mut count = QueryBuilder::new(format!("SELECT COUNT(*) {from}"));
    push_filters(&mut count, user_id, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::new(format!(
        "SELECT c.id, c.user_id, u.username, c.quantity, c.book_format, c.grade, \
         c.grading_company, c.purchase_date, c.is_read, c.rating, c.modified, \
         i.id AS issue_id, i.number, i.cover_date, i.store_date, i.modified AS issue_modified, \
         s.name AS series_name, s.volume AS series_volume, s.year_began AS series_year_began {from}"
    ));
    push_filters(&mut query, user_id, filter);
    query
        .push(" ORDER BY s.sort_name, i.cover_date, c.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = query
        .build_query_as::<CollectionListRow>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

/// The item, only when it belongs to `user_id`.
pub async fn find_for_user(pool: &PgPool, id: i64, user_id: i64) -> Result<Option<CollectionItem>, sqlx::Error> {
    sqlx::query_as::<_, CollectionItem>("SELECT * FROM collection_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Read history, oldest first.
pub async fn read_dates(pool: &PgPool, item_id: i64) -> Result<Vec<ReadDate>, sqlx::Error> {
    sqlx::query_as::<_, ReadDate>(
        "SELECT id, read_date, created_on FROM collection_read_dates WHERE item_id = $1 \
         ORDER BY read_date, id",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    user_id: i64,
    req: &CreateCollectionItemRequest,
) -> Result<CollectionItem, sqlx::Error> {
    sqlx::query_as::<_, CollectionItem>(
        r#"
        INSERT INTO collection_items (user_id, issue_id, quantity, book_format, grade,
                                      grading_company, purchase_date, purchase_price,
                                      purchase_price_currency, purchase_store, storage_location,
                                      notes, is_read, date_read, rating)
        VALUES ($1, $2, COALESCE($3, 1), COALESCE($4, 'PRINT'), $5, COALESCE($6, ''), $7, $8,
                COALESCE($9, 'USD'), COALESCE($10, ''), COALESCE($11, ''), COALESCE($12, ''),
                COALESCE($13, FALSE), $14, $15)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(req.issue)
    .bind(req.quantity)
    .bind(req.book_format.map(|f| f.as_str()))
    .bind(&req.grade)
    .bind(req.grading_company.map(|c| c.as_str()))
    .bind(req.purchase_date)
    .bind(&req.purchase_price)
    .bind(&req.purchase_price_currency)
    .bind(&req.purchase_store)
    .bind(&req.storage_location)
    .bind(&req.notes)
    .bind(req.is_read)
    .bind(req.date_read)
    .bind(req.rating)
    .fetch_one(pool)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    user_id: i64,
    req: &UpdateCollectionItemRequest,
) -> Result<Option<CollectionItem>, sqlx::Error> {
    sqlx::query_as::<_, CollectionItem>(
        r#"
        UPDATE collection_items SET
            quantity = COALESCE($3, quantity),
            book_format = COALESCE($4, book_format),
            grade = COALESCE($5, grade),
            grading_company = COALESCE($6, grading_company),
            purchase_date = COALESCE($7, purchase_date),
            purchase_price = COALESCE($8, purchase_price),
            purchase_price_currency = COALESCE($9, purchase_price_currency),
            purchase_store = COALESCE($10, purchase_store),
            storage_location = COALESCE($11, storage_location),
            notes = COALESCE($12, notes),
            is_read = COALESCE($13, is_read),
            date_read = COALESCE($14, date_read),
            rating = COALESCE($15, rating),
            modified = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(req.quantity)
    .bind(req.book_format.map(|f| f.as_str()))
    .bind(&req.grade)
    .bind(req.grading_company.map(|c| c.as_str()))
    .bind(req.purchase_date)
    .bind(&req.purchase_price)
    .bind(&req.purchase_price_currency)
    .bind(&req.purchase_store)
    .bind(&req.storage_location)
    .bind(&req.notes)
    .bind(req.is_read)
    .bind(req.date_read)
    .bind(req.rating)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM collection_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[derive(sqlx::FromRow)]
struct Totals {
    total_items: i64,
    total_quantity: i64,
    total_value: String,
    read_count: i64,
}

pub async fn stats(pool: &PgPool, user_id: i64) -> Result<CollectionStats, sqlx::Error> {
    let totals = sqlx::query_as::<_, Totals>(
        r#"
        SELECT COUNT(*) AS total_items,
               COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
               COALESCE(SUM(purchase_price::NUMERIC), 0)::NUMERIC(12, 2)::TEXT AS total_value,
               COUNT(*) FILTER (WHERE is_read) AS read_count
        FROM collection_items
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let by_format = sqlx::query_as::<_, FormatCount>(
        "SELECT book_format, COUNT(*) AS count FROM collection_items WHERE user_id = $1 \
         GROUP BY book_format ORDER BY book_format",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CollectionStats {
        unread_count: totals.total_items - totals.read_count,
        total_items: totals.total_items,
        total_quantity: totals.total_quantity,
        total_value: totals.total_value,
        read_count: totals.read_count,
        by_format,
    })
}

/// Series the user has started but not finished, most missing first.
pub async fn missing_series(
    pool: &PgPool,
    user_id: i64,
    page: &PageRequest,
) -> Result<(Vec<MissingSeriesRow>, i64), sqlx::Error> {
    const COUNTS: &str = r#"
        WITH counts AS (
            SELECT i.series_id,
                   COUNT(*) AS total_issues,
                   COUNT(c.id) AS owned_issues
            FROM issues i
            LEFT JOIN collection_items c ON c.issue_id = i.id AND c.user_id = $1
            GROUP BY i.series_id
            HAVING COUNT(c.id) > 0 AND COUNT(c.id) < COUNT(*)
        )
    "#;

    let total: i64 = sqlx::query_scalar(&format!("{COUNTS} SELECT COUNT(*) FROM counts"))
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, MissingSeriesRow>(&format!(
        "{COUNTS} \
         SELECT s.id, s.name, s.sort_name, s.year_began, s.year_end, \
                p.id AS publisher_id, p.name AS publisher_name, \
                t.id AS series_type_id, t.name AS series_type_name, \
                counts.total_issues, counts.owned_issues \
         FROM counts \
         JOIN series s ON s.id = counts.series_id \
         JOIN publishers p ON p.id = s.publisher_id \
         JOIN series_types t ON t.id = s.series_type_id \
         ORDER BY counts.total_issues - counts.owned_issues DESC, s.sort_name, s.id \
         LIMIT $2 OFFSET $3"
    ))
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

/// Issues of `series_id` the user does not own.
pub async fn missing_issues(
    pool: &PgPool,
    user_id: i64,
    series_id: i64,
    page: &PageRequest,
) -> Result<(Vec<IssueListRow>, i64), sqlx::Error> {
    let scope = "i.series_id = $1 AND NOT EXISTS \
        (SELECT 1 FROM collection_items c WHERE c.issue_id = i.id AND c.user_id = $2)";

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM issues i WHERE {scope}"))
        .bind(series_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, IssueListRow>(&format!(
        "{LIST_SELECT} WHERE {scope} ORDER BY i.cover_date, i.number, i.id LIMIT $3 OFFSET $4"
    ))
    .bind(series_id)
    .bind(user_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

/// Mark an issue read, adding it to the collection as a single digital copy when the
/// user does not own it yet. Returns the item and whether it was created.
pub async fn scrobble(
    pool: &PgPool,
    user_id: i64,
    issue_id: i64,
    date_read: DateTime<Utc>,
    rating: Option<i32>,
) -> Result<(CollectionItem, bool), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let inserted: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT INTO collection_items (user_id, issue_id, quantity, book_format)
        VALUES ($1, $2, 1, 'DIGITAL')
        ON CONFLICT (user_id, issue_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(issue_id)
    .fetch_optional(&mut *tx)
    .await?;

    let item = sqlx::query_as::<_, CollectionItem>(
        r#"
        UPDATE collection_items SET
            is_read = TRUE,
            date_read = $3,
            rating = COALESCE($4, rating),
            modified = NOW()
        WHERE user_id = $1 AND issue_id = $2
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(issue_id)
    .bind(date_read)
    .bind(rating)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO collection_read_dates (item_id, read_date) VALUES ($1, $2)")
        .bind(item.id)
        .bind(date_read)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok((item, inserted.is_some()))
}
