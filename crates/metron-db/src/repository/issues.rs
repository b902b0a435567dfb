//! Issue repository: issue rows, their relations, and the reprint-sync and
//! credit-duplication writes.

use chrono::NaiveDate;
use metron_common::models::{
    CreateIssueRequest, Issue, IssueFilter, IssueListRow, IssueRef, IssueRelations,
    UpdateIssueRequest, issue_display, ratings,
};
use metron_common::pagination::PageRequest;
use metron_common::reprints::{CollectionState, ReprintSource, SyncPlan};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{Link, add_links, linked_ids, linked_refs, links, set_links};

pub(super) const LIST_SELECT: &str = "SELECT i.id, i.number, i.cover_date, i.store_date, i.modified, \
    s.name AS series_name, s.volume AS series_volume, s.year_began AS series_year_began, \
    s.series_type_id \
    FROM issues i JOIN series s ON s.id = i.series_id";

/// Collection ordering: by cover date, then series, then number.
const RELATION_ORDER: &str = " ORDER BY i.cover_date, s.sort_name, i.number, i.id";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &IssueFilter) {
    if let Some(series_id) = filter.series_id {
        qb.push(" AND i.series_id = ").push_bind(series_id);
    }
    if let Some(number) = &filter.number {
        qb.push(" AND i.number = ").push_bind(number.clone());
    }
    if let Some(year) = filter.cover_year {
        qb.push(" AND EXTRACT(YEAR FROM i.cover_date)::INTEGER = ")
            .push_bind(year);
    }
    if let Some(store_date) = filter.store_date {
        qb.push(" AND i.store_date = ").push_bind(store_date);
    }
    if let Some(modified) = filter.modified_gt {
        qb.push(" AND i.modified > ").push_bind(modified);
    }
    if let Some(cv_id) = filter.cv_id {
        qb.push(" AND i.cv_id = ").push_bind(cv_id);
    }
    if let Some(gcd_id) = filter.gcd_id {
        qb.push(" AND i.gcd_id = ").push_bind(gcd_id);
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &IssueFilter,
    page: &PageRequest,
) -> Result<(Vec<IssueListRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM issues i WHERE TRUE");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::new(format!("{LIST_SELECT} WHERE TRUE"));
    push_filters(&mut query, filter);
    query
        .push(" ORDER BY s.sort_name, i.cover_date, i.number, i.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = query
        .build_query_as::<IssueListRow>()
        .fetch_all(pool)
        .await?;
    Ok((rows, total))
}

/// Issues linked to `target_id` through `link` (e.g. every issue a character appears in).
pub async fn list_for_link(
    pool: &PgPool,
    link: Link,
    target_id: i64,
    page: &PageRequest,
) -> Result<(Vec<IssueListRow>, i64), sqlx::Error> {
    let scope = format!(
        "i.id IN (SELECT {owner} FROM {table} WHERE {target} = $1)",
        owner = link.owner,
        table = link.table,
        target = link.target
    );

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM issues i WHERE {scope}"))
        .bind(target_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query_as::<_, IssueListRow>(&format!(
        "{LIST_SELECT} WHERE {scope}{RELATION_ORDER} LIMIT $2 OFFSET $3"
    ))
    .bind(target_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

/// Issues of a series in reading order.
pub async fn list_for_series(
    pool: &PgPool,
    series_id: i64,
    page: &PageRequest,
) -> Result<(Vec<IssueListRow>, i64), sqlx::Error> {
    let total = super::series::issue_count(pool, series_id).await?;
    let rows = sqlx::query_as::<_, IssueListRow>(&format!(
        "{LIST_SELECT} WHERE i.series_id = $1{RELATION_ORDER} LIMIT $2 OFFSET $3"
    ))
    .bind(series_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((rows, total))
}

/// Most recently modified issues, for the home feed.
pub async fn recently_edited(pool: &PgPool, limit: i64) -> Result<Vec<IssueListRow>, sqlx::Error> {
    sqlx::query_as::<_, IssueListRow>(&format!(
        "{LIST_SELECT} ORDER BY i.modified DESC, i.id DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Issue>, sqlx::Error> {
    sqlx::query_as::<_, Issue>("SELECT * FROM issues WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// The issue as it appears in lists.
pub async fn find_list_row(pool: &PgPool, id: i64) -> Result<Option<IssueListRow>, sqlx::Error> {
    sqlx::query_as::<_, IssueListRow>(&format!("{LIST_SELECT} WHERE i.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Issues reprinted in `id`, oldest cover date first.
pub async fn reprints(pool: &PgPool, id: i64) -> Result<Vec<IssueListRow>, sqlx::Error> {
    sqlx::query_as::<_, IssueListRow>(&format!(
        "{LIST_SELECT} JOIN issue_reprints r ON r.reprint_id = i.id \
         WHERE r.issue_id = $1 ORDER BY i.cover_date, i.id"
    ))
    .bind(id)
    .fetch_all(pool)
    .await
}

pub async fn relations(pool: &PgPool, id: i64) -> Result<IssueRelations, sqlx::Error> {
    Ok(IssueRelations {
        characters: linked_refs(pool, links::ISSUE_CHARACTERS, id).await?,
        teams: linked_refs(pool, links::ISSUE_TEAMS, id).await?,
        arcs: linked_refs(pool, links::ISSUE_ARCS, id).await?,
        universes: linked_refs(pool, links::ISSUE_UNIVERSES, id).await?,
        reprints: reprints(pool, id)
            .await?
            .into_iter()
            .map(IssueRef::from)
            .collect(),
        credits: super::credits::for_issue(pool, id).await?,
        variants: super::variants::for_issue(pool, id).await?,
    })
}

pub async fn create(
    pool: &PgPool,
    req: &CreateIssueRequest,
    slug: &str,
    user_id: i64,
) -> Result<Issue, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let issue = sqlx::query_as::<_, Issue>(
        r#"
        INSERT INTO issues (series_id, number, alt_number, title, slug, name, cover_date, store_date,
                            foc_date, price, price_currency, sku, isbn, upc, page, description,
                            cv_id, gcd_id, created_by, edited_by, rating_id)
        VALUES ($1, $2, COALESCE($3, ''), COALESCE($4, ''), $5, $6, $7, $8, $9, $10,
                COALESCE($11, 'USD'), COALESCE($12, ''), COALESCE($13, ''), COALESCE($14, ''),
                $15, COALESCE($16, ''), $17, $18, $19, $19, $20)
        RETURNING *
        "#,
    )
    .bind(req.series)
    .bind(&req.number)
    .bind(&req.alt_number)
    .bind(&req.title)
    .bind(slug)
    .bind(&req.name)
    .bind(req.cover_date)
    .bind(req.store_date)
    .bind(req.foc_date)
    .bind(&req.price)
    .bind(&req.price_currency)
    .bind(&req.sku)
    .bind(&req.isbn)
    .bind(&req.upc)
    .bind(req.page)
    .bind(&req.description)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .bind(req.rating.unwrap_or(ratings::UNKNOWN))
    .fetch_one(&mut *tx)
    .await?;

    set_links(&mut tx, links::ISSUE_CHARACTERS, issue.id, &req.characters).await?;
    set_links(&mut tx, links::ISSUE_TEAMS, issue.id, &req.teams).await?;
    set_links(&mut tx, links::ISSUE_ARCS, issue.id, &req.arcs).await?;
    set_links(&mut tx, links::ISSUE_UNIVERSES, issue.id, &req.universes).await?;
    set_links(&mut tx, links::ISSUE_REPRINTS, issue.id, &req.reprints).await?;

    tx.commit().await?;
    Ok(issue)
}

/// Partial update. Relation lists present in `req` replace the stored set.
pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateIssueRequest,
    user_id: i64,
) -> Result<Option<Issue>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let issue = sqlx::query_as::<_, Issue>(
        r#"
        UPDATE issues SET
            series_id = COALESCE($2, series_id),
            number = COALESCE($3, number),
            alt_number = COALESCE($4, alt_number),
            title = COALESCE($5, title),
            slug = COALESCE($6, slug),
            name = COALESCE($7, name),
            cover_date = COALESCE($8, cover_date),
            store_date = COALESCE($9, store_date),
            foc_date = COALESCE($10, foc_date),
            price = COALESCE($11, price),
            price_currency = COALESCE($12, price_currency),
            sku = COALESCE($13, sku),
            isbn = COALESCE($14, isbn),
            upc = COALESCE($15, upc),
            page = COALESCE($16, page),
            description = COALESCE($17, description),
            cv_id = COALESCE($18, cv_id),
            gcd_id = COALESCE($19, gcd_id),
            edited_by = $20,
            rating_id = COALESCE($21, rating_id),
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(req.series)
    .bind(&req.number)
    .bind(&req.alt_number)
    .bind(&req.title)
    .bind(&req.slug)
    .bind(&req.name)
    .bind(req.cover_date)
    .bind(req.store_date)
    .bind(req.foc_date)
    .bind(&req.price)
    .bind(&req.price_currency)
    .bind(&req.sku)
    .bind(&req.isbn)
    .bind(&req.upc)
    .bind(req.page)
    .bind(&req.description)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .bind(req.rating)
    .fetch_optional(&mut *tx)
    .await?;

    if issue.is_some() {
        let replacements = [
            (links::ISSUE_CHARACTERS, &req.characters),
            (links::ISSUE_TEAMS, &req.teams),
            (links::ISSUE_ARCS, &req.arcs),
            (links::ISSUE_UNIVERSES, &req.universes),
            (links::ISSUE_REPRINTS, &req.reprints),
        ];
        for (link, ids) in replacements {
            if let Some(ids) = ids {
                set_links(&mut tx, link, id, ids).await?;
            }
        }
    }

    tx.commit().await?;
    Ok(issue)
}

pub async fn arc_count(pool: &PgPool, id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM issue_arcs WHERE issue_id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

// -----------------------------------------------------------------------
// Reprint sync
// -----------------------------------------------------------------------

/// What a collection issue currently holds, or `None` if the issue does not exist.
pub async fn collection_state(pool: &PgPool, id: i64) -> Result<Option<CollectionState>, sqlx::Error> {
    let row: Option<(i64, Vec<String>)> = sqlx::query_as(
        "SELECT s.series_type_id, i.name FROM issues i JOIN series s ON s.id = i.series_id WHERE i.id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some((series_type_id, stories)) = row else {
        return Ok(None);
    };

    Ok(Some(CollectionState {
        series_type_id,
        character_ids: linked_ids(pool, links::ISSUE_CHARACTERS, id).await?,
        team_ids: linked_ids(pool, links::ISSUE_TEAMS, id).await?,
        stories,
    }))
}

#[derive(sqlx::FromRow)]
struct ReprintRow {
    id: i64,
    number: String,
    stories: Vec<String>,
    series_name: String,
    series_year_began: i32,
    series_type_id: i64,
    character_ids: Vec<i64>,
    team_ids: Vec<i64>,
}

/// Reprinted issues with their stories, characters and teams, in cover-date order.
pub async fn reprint_sources(pool: &PgPool, id: i64) -> Result<Vec<ReprintSource>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ReprintRow>(
        r#"
        SELECT i.id, i.number, i.name AS stories,
               s.name AS series_name, s.year_began AS series_year_began, s.series_type_id,
               ARRAY(SELECT ic.character_id FROM issue_characters ic
                     WHERE ic.issue_id = i.id ORDER BY ic.character_id) AS character_ids,
               ARRAY(SELECT it.team_id FROM issue_teams it
                     WHERE it.issue_id = i.id ORDER BY it.team_id) AS team_ids
        FROM issue_reprints r
        JOIN issues i ON i.id = r.reprint_id
        JOIN series s ON s.id = i.series_id
        WHERE r.issue_id = $1
        ORDER BY i.cover_date, i.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ReprintSource {
            id: r.id,
            display: issue_display(&r.series_name, r.series_year_began, r.series_type_id, &r.number),
            stories: r.stories,
            character_ids: r.character_ids,
            team_ids: r.team_ids,
        })
        .collect())
}

/// Write a reprint-sync plan in one transaction.
pub async fn apply_reprint_sync(
    pool: &PgPool,
    id: i64,
    plan: &SyncPlan,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    add_links(&mut tx, links::ISSUE_CHARACTERS, id, &plan.character_ids).await?;
    add_links(&mut tx, links::ISSUE_TEAMS, id, &plan.team_ids).await?;
    sqlx::query("UPDATE issues SET name = $2, edited_by = $3, modified = NOW() WHERE id = $1")
        .bind(id)
        .bind(&plan.stories)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

// -----------------------------------------------------------------------
// Credit duplication
// -----------------------------------------------------------------------

/// The bits of an issue that credit duplication needs.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IssueContext {
    pub id: i64,
    pub series_id: i64,
    pub cover_date: NaiveDate,
    pub publisher_name: String,
}

pub async fn context(pool: &PgPool, id: i64) -> Result<Option<IssueContext>, sqlx::Error> {
    sqlx::query_as::<_, IssueContext>(
        r#"
        SELECT i.id, i.series_id, i.cover_date, p.name AS publisher_name
        FROM issues i
        JOIN series s ON s.id = i.series_id
        JOIN publishers p ON p.id = s.publisher_id
        WHERE i.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// The latest issue of the series with a cover date strictly before `cover_date`.
pub async fn previous_in_series(
    pool: &PgPool,
    series_id: i64,
    cover_date: NaiveDate,
) -> Result<Option<IssueListRow>, sqlx::Error> {
    sqlx::query_as::<_, IssueListRow>(&format!(
        "{LIST_SELECT} WHERE i.series_id = $1 AND i.cover_date < $2 \
         ORDER BY i.cover_date DESC, i.id DESC LIMIT 1"
    ))
    .bind(series_id)
    .bind(cover_date)
    .fetch_optional(pool)
    .await
}
