//! Team repository.

use metron_common::models::{CreateTeamRequest, NameFilter, NamedListItem, Team, UpdateTeamRequest};
use metron_common::pagination::PageRequest;
use sqlx::PgPool;

use super::{links, set_links};

pub async fn list(
    pool: &PgPool,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    super::list_named(pool, "teams", filter, page).await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateTeamRequest,
    slug: &str,
    user_id: i64,
) -> Result<Team, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let team = sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (name, slug, description, cv_id, gcd_id, created_by, edited_by)
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
    .fetch_one(&mut *tx)
    .await?;

    set_links(&mut tx, links::TEAM_CREATORS, team.id, &req.creators).await?;
    set_links(&mut tx, links::TEAM_UNIVERSES, team.id, &req.universes).await?;

    tx.commit().await?;
    Ok(team)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateTeamRequest,
    user_id: i64,
) -> Result<Option<Team>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let team = sqlx::query_as::<_, Team>(
        r#"
        UPDATE teams SET
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
    .fetch_optional(&mut *tx)
    .await?;

    if team.is_some() {
        if let Some(ids) = &req.creators {
            set_links(&mut tx, links::TEAM_CREATORS, id, ids).await?;
        }
        if let Some(ids) = &req.universes {
            set_links(&mut tx, links::TEAM_UNIVERSES, id, ids).await?;
        }
    }

    tx.commit().await?;
    Ok(team)
}
