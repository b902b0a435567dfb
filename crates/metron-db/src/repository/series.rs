//! Series repository.

use metron_common::models::{
    AssociatedSeries, CreateSeriesRequest, Series, SeriesFilter, SeriesLabelRow, SeriesListRow,
    SeriesRelations, SeriesStatus, UpdateSeriesRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::{contains_pattern, escape_like, linked_refs, links, set_links};

const LIST_COLUMNS: &str = "s.id, s.name, s.volume, s.year_began, s.series_type_id, s.modified, \
    (SELECT COUNT(*) FROM issues i WHERE i.series_id = s.id) AS issue_count";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &SeriesFilter) {
    // Every word has to match somewhere in the name.
    if let Some(name) = filter.name.as_deref() {
        for word in name.split_whitespace() {
            qb.push(" AND s.name ILIKE ").push_bind(contains_pattern(word));
        }
    }
    if let Some(publisher_id) = filter.publisher_id {
        qb.push(" AND s.publisher_id = ").push_bind(publisher_id);
    }
    if let Some(series_type_id) = filter.series_type_id {
        qb.push(" AND s.series_type_id = ").push_bind(series_type_id);
    }
    if let Some(status) = filter.status {
        qb.push(" AND s.status = ").push_bind(status);
    }
    if let Some(year_began) = filter.year_began {
        qb.push(" AND s.year_began = ").push_bind(year_began);
    }
    if let Some(volume) = filter.volume {
        qb.push(" AND s.volume = ").push_bind(volume);
    }
    if let Some(modified) = filter.modified_gt {
        qb.push(" AND s.modified > ").push_bind(modified);
    }
    if let Some(cv_id) = filter.cv_id {
        qb.push(" AND s.cv_id = ").push_bind(cv_id);
    }
    if let Some(gcd_id) = filter.gcd_id {
        qb.push(" AND s.gcd_id = ").push_bind(gcd_id);
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &SeriesFilter,
    page: &PageRequest,
) -> Result<(Vec<SeriesListRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM series s WHERE TRUE");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::new(format!("SELECT {LIST_COLUMNS} FROM series s WHERE TRUE"));
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY s.sort_name, s.year_began, s.volume, s.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = query
        .build_query_as::<SeriesListRow>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Series>, sqlx::Error> {
    sqlx::query_as::<_, Series>("SELECT * FROM series WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn issue_count(pool: &PgPool, id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM issues WHERE series_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateSeriesRequest,
    slug: &str,
    sort_name: &str,
    user_id: i64,
) -> Result<Series, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let series = sqlx::query_as::<_, Series>(
        r#"
        INSERT INTO series (name, slug, sort_name, volume, year_began, year_end, series_type_id,
                            status, publisher_id, imprint_id, collection, description, cv_id, gcd_id,
                            created_by, edited_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, FALSE), COALESCE($12, ''),
                $13, $14, $15, $15)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(slug)
    .bind(sort_name)
    .bind(req.volume)
    .bind(req.year_began)
    .bind(req.year_end)
    .bind(req.series_type)
    .bind(req.status.unwrap_or(SeriesStatus::Ongoing))
    .bind(req.publisher)
    .bind(req.imprint)
    .bind(req.collection)
    .bind(&req.description)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    set_links(&mut tx, links::SERIES_GENRES, series.id, &req.genres).await?;
    set_associated(&mut tx, series.id, &req.associated).await?;

    tx.commit().await?;
    Ok(series)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateSeriesRequest,
    user_id: i64,
) -> Result<Option<Series>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let series = sqlx::query_as::<_, Series>(
        r#"
        UPDATE series SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            sort_name = COALESCE($4, sort_name),
            volume = COALESCE($5, volume),
            year_began = COALESCE($6, year_began),
            year_end = COALESCE($7, year_end),
            series_type_id = COALESCE($8, series_type_id),
            status = COALESCE($9, status),
            publisher_id = COALESCE($10, publisher_id),
            imprint_id = COALESCE($11, imprint_id),
            collection = COALESCE($12, collection),
            description = COALESCE($13, description),
            cv_id = COALESCE($14, cv_id),
            gcd_id = COALESCE($15, gcd_id),
            edited_by = $16,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.sort_name)
    .bind(req.volume)
    .bind(req.year_began)
    .bind(req.year_end)
    .bind(req.series_type)
    .bind(req.status)
    .bind(req.publisher)
    .bind(req.imprint)
    .bind(req.collection)
    .bind(&req.description)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if series.is_some() {
        if let Some(genres) = &req.genres {
            set_links(&mut tx, links::SERIES_GENRES, id, genres).await?;
        }
        if let Some(associated) = &req.associated {
            set_associated(&mut tx, id, associated).await?;
        }
    }

    tx.commit().await?;
    Ok(series)
}

/// Replace the associated series of `id`. Links are stored in both directions.
async fn set_associated(conn: &mut PgConnection, id: i64, ids: &[i64]) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM series_associated WHERE series_id = $1 OR associated_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if ids.is_empty() {
        return Ok(());
    }
    sqlx::query(
        r#"
        INSERT INTO series_associated (series_id, associated_id)
        SELECT $1, v.id FROM UNNEST($2::BIGINT[]) AS v(id)
        UNION
        SELECT v.id, $1 FROM UNNEST($2::BIGINT[]) AS v(id)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(id)
    .bind(ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Genres and associated series, each sorted for display.
pub async fn relations(pool: &PgPool, id: i64) -> Result<SeriesRelations, sqlx::Error> {
    let associated = sqlx::query_as::<_, SeriesLabelRow>(
        r#"
        SELECT s.id, s.name, s.year_began, s.series_type_id
        FROM series_associated a
        JOIN series s ON s.id = a.associated_id
        WHERE a.series_id = $1
        ORDER BY s.sort_name, s.year_began, s.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(SeriesRelations {
        genres: linked_refs(pool, links::SERIES_GENRES, id).await?,
        associated: associated.into_iter().map(AssociatedSeries::from).collect(),
    })
}

/// Write a batch of issue slugs in one statement.
///
/// The slug unique check is deferred to commit, so issues may trade slugs within the
/// batch. Returns the number of issues updated.
pub async fn rename_issue_slugs(
    pool: &PgPool,
    updates: &[(i64, String)],
) -> Result<u64, sqlx::Error> {
    if updates.is_empty() {
        return Ok(0);
    }
    let (ids, slugs): (Vec<i64>, Vec<String>) = updates.iter().cloned().unzip();

    let mut tx = pool.begin().await?;
    sqlx::query("SET CONSTRAINTS issues_slug_key DEFERRED")
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query(
        r#"
        UPDATE issues SET slug = v.slug, modified = NOW()
        FROM UNNEST($1::BIGINT[], $2::TEXT[]) AS v(id, slug)
        WHERE issues.id = v.id
        "#,
    )
    .bind(&ids)
    .bind(&slugs)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(result.rows_affected())
}

/// `(id, number)` of every issue in the series.
pub async fn issue_numbers(pool: &PgPool, id: i64) -> Result<Vec<(i64, String)>, sqlx::Error> {
    sqlx::query_as("SELECT id, number FROM issues WHERE series_id = $1 ORDER BY id")
        .bind(id)
        .fetch_all(pool)
        .await
}

/// Slugs starting with `prefix` held by issues of other series.
pub async fn foreign_issue_slugs(
    pool: &PgPool,
    id: i64,
    prefix: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT slug FROM issues WHERE series_id <> $1 AND slug LIKE $2 || '%'")
        .bind(id)
        .bind(escape_like(prefix))
        .fetch_all(pool)
        .await
}
