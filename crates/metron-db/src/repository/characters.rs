//! Character repository. Creator, team and universe links are written in the same
//! transaction as the row.

use metron_common::models::{
    Character, CreateCharacterRequest, NameFilter, NamedListItem, UpdateCharacterRequest,
};
use metron_common::pagination::PageRequest;
use sqlx::PgPool;

use super::{links, set_links};

pub async fn list(
    pool: &PgPool,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    super::list_named(pool, "characters", filter, page).await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Character>, sqlx::Error> {
    sqlx::query_as::<_, Character>("SELECT * FROM characters WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &PgPool,
    req: &CreateCharacterRequest,
    slug: &str,
    user_id: i64,
) -> Result<Character, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let character = sqlx::query_as::<_, Character>(
        r#"
        INSERT INTO characters (name, slug, description, alias, cv_id, gcd_id, created_by, edited_by)
        VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6, $7, $7)
        RETURNING *
        "#,
    )
    .bind(&req.name)
    .bind(slug)
    .bind(&req.description)
    .bind(&req.alias)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    set_links(&mut tx, links::CHARACTER_CREATORS, character.id, &req.creators).await?;
    set_links(&mut tx, links::CHARACTER_TEAMS, character.id, &req.teams).await?;
    set_links(&mut tx, links::CHARACTER_UNIVERSES, character.id, &req.universes).await?;

    tx.commit().await?;
    Ok(character)
}

/// Link lists that are present replace the stored set.
pub async fn update(
    pool: &PgPool,
    id: i64,
    req: &UpdateCharacterRequest,
    user_id: i64,
) -> Result<Option<Character>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let character = sqlx::query_as::<_, Character>(
        r#"
        UPDATE characters SET
            name = COALESCE($2, name),
            slug = COALESCE($3, slug),
            description = COALESCE($4, description),
            alias = COALESCE($5, alias),
            cv_id = COALESCE($6, cv_id),
            gcd_id = COALESCE($7, gcd_id),
            edited_by = $8,
            modified = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.slug)
    .bind(&req.description)
    .bind(&req.alias)
    .bind(req.cv_id)
    .bind(req.gcd_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    if character.is_some() {
        if let Some(ids) = &req.creators {
            set_links(&mut tx, links::CHARACTER_CREATORS, id, ids).await?;
        }
        if let Some(ids) = &req.teams {
            set_links(&mut tx, links::CHARACTER_TEAMS, id, ids).await?;
        }
        if let Some(ids) = &req.universes {
            set_links(&mut tx, links::CHARACTER_UNIVERSES, id, ids).await?;
        }
    }

    tx.commit().await?;
    Ok(character)
}
