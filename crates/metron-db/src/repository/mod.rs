//! Repository layer: query functions organized by resource.
//!
//! Every function takes a `&PgPool` (or a connection inside a transaction) and returns
//! `sqlx::Error`; the API layer converts those into `MetronError`.

pub mod arcs;
pub mod characters;
pub mod creators;
pub mod collections;
pub mod credits;
pub mod genres;
pub mod imprints;
pub mod issues;
pub mod publishers;
pub mod reading_lists;
pub mod roles;
pub mod series;
pub mod series_types;
pub mod statistics;
pub mod teams;
pub mod universes;
pub mod users;
pub mod variants;

use metron_common::models::{NameFilter, NamedListItem, NamedRef};
use metron_common::pagination::PageRequest;
use metron_common::slug::unique_slug;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

/// A many-to-many join table: `owner` rows linked to `target` rows.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub table: &'static str,
    pub owner: &'static str,
    pub target: &'static str,
    /// Table the target ids point into, for name lookups.
    pub target_table: &'static str,
}

pub mod links {
    use super::Link;

    pub const ISSUE_CHARACTERS: Link = Link {
        table: "issue_characters",
        owner: "issue_id",
        target: "character_id",
        target_table: "characters",
    };
    pub const ISSUE_TEAMS: Link = Link {
        table: "issue_teams",
        owner: "issue_id",
        target: "team_id",
        target_table: "teams",
    };
    pub const ISSUE_ARCS: Link = Link {
        table: "issue_arcs",
        owner: "issue_id",
        target: "arc_id",
        target_table: "arcs",
    };
    pub const ISSUE_UNIVERSES: Link = Link {
        table: "issue_universes",
        owner: "issue_id",
        target: "universe_id",
        target_table: "universes",
    };
    pub const ISSUE_REPRINTS: Link = Link {
        table: "issue_reprints",
        owner: "issue_id",
        target: "reprint_id",
        target_table: "issues",
    };
    /// Credits link issues to creators, so creator issue lists use them like a join table.
    pub const ISSUE_CREATORS: Link = Link {
        table: "credits",
        owner: "issue_id",
        target: "creator_id",
        target_table: "creators",
    };
    pub const CHARACTER_CREATORS: Link = Link {
        table: "character_creators",
        owner: "character_id",
        target: "creator_id",
        target_table: "creators",
    };
    pub const CHARACTER_TEAMS: Link = Link {
        table: "character_teams",
        owner: "character_id",
        target: "team_id",
        target_table: "teams",
    };
    pub const CHARACTER_UNIVERSES: Link = Link {
        table: "character_universes",
        owner: "character_id",
        target: "universe_id",
        target_table: "universes",
    };
    pub const TEAM_CREATORS: Link = Link {
        table: "team_creators",
        owner: "team_id",
        target: "creator_id",
        target_table: "creators",
    };
    pub const SERIES_GENRES: Link = Link {
        table: "series_genres",
        owner: "series_id",
        target: "genre_id",
        target_table: "genres",
    };
    pub const TEAM_UNIVERSES: Link = Link {
        table: "team_universes",
        owner: "team_id",
        target: "universe_id",
        target_table: "universes",
    };
}

/// Replace every link of `owner_id` with `ids`.
pub async fn set_links(
    conn: &mut PgConnection,
    link: Link,
    owner_id: i64,
    ids: &[i64],
) -> Result<(), sqlx::Error> {
    let delete = format!("DELETE FROM {} WHERE {} = $1", link.table, link.owner);
    sqlx::query(&delete).bind(owner_id).execute(&mut *conn).await?;
    add_links(conn, link, owner_id, ids).await
}

/// Add links, ignoring ones that already exist.
pub async fn add_links(
    conn: &mut PgConnection,
    link: Link,
    owner_id: i64,
    ids: &[i64],
) -> Result<(), sqlx::Error> {
    if ids.is_empty() {
        return Ok(());
    }
    let insert = format!(
        "INSERT INTO {} ({}, {}) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
        link.table, link.owner, link.target
    );
    sqlx::query(&insert)
        .bind(owner_id)
        .bind(ids)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Target ids linked to `owner_id`, in id order.
pub async fn linked_ids(pool: &PgPool, link: Link, owner_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let query = format!(
        "SELECT {target} FROM {table} WHERE {owner} = $1 ORDER BY {target}",
        target = link.target,
        table = link.table,
        owner = link.owner
    );
    sqlx::query_scalar(&query).bind(owner_id).fetch_all(pool).await
}

/// `{id, name}` of every target linked to `owner_id`, sorted by name.
pub async fn linked_refs(pool: &PgPool, link: Link, owner_id: i64) -> Result<Vec<NamedRef>, sqlx::Error> {
    let query = format!(
        "SELECT t.id, t.name FROM {target_table} t \
         JOIN {table} l ON l.{target} = t.id \
         WHERE l.{owner} = $1 \
         ORDER BY t.name, t.id",
        target_table = link.target_table,
        table = link.table,
        target = link.target,
        owner = link.owner
    );
    sqlx::query_as::<_, NamedRef>(&query)
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

/// `{id, name}` of a row in any name-keyed table.
pub async fn named_ref(pool: &PgPool, table: &str, id: i64) -> Result<Option<NamedRef>, sqlx::Error> {
    let query = format!("SELECT id, name FROM {table} WHERE id = $1");
    sqlx::query_as::<_, NamedRef>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Escape the LIKE wildcards (`%`, `_`) and the escape character itself, so `value`
/// matches literally. Postgres uses `\` as the default LIKE escape.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `%value%` for a case-insensitive "contains" filter, with `value` trimmed and escaped.
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value.trim()))
}

/// First free slug for `base` in `table`.
pub async fn next_slug(pool: &PgPool, table: &str, base: &str) -> Result<String, sqlx::Error> {
    let query = format!("SELECT slug FROM {table} WHERE slug LIKE $1 || '%'");
    let existing: Vec<String> = sqlx::query_scalar(&query)
        .bind(escape_like(base))
        .fetch_all(pool)
        .await?;
    Ok(unique_slug(base, &existing))
}

/// Append the shared name/date/external-id filters. The query must already have a
/// `WHERE` clause; every filter is added with `AND`.
pub fn push_name_filters(qb: &mut QueryBuilder<'_, Postgres>, alias: &str, filter: &NameFilter) {
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        qb.push(format!(" AND {alias}.name ILIKE "))
            .push_bind(contains_pattern(name));
    }
    if let Some(modified) = filter.modified_gt {
        qb.push(format!(" AND {alias}.modified > ")).push_bind(modified);
    }
    if let Some(cv_id) = filter.cv_id {
        qb.push(format!(" AND {alias}.cv_id = ")).push_bind(cv_id);
    }
    if let Some(gcd_id) = filter.gcd_id {
        qb.push(format!(" AND {alias}.gcd_id = ")).push_bind(gcd_id);
    }
}

/// Paginated `{id, name, modified}` list of a name-keyed table.
pub async fn list_named(
    pool: &PgPool,
    table: &str,
    filter: &NameFilter,
    page: &PageRequest,
) -> Result<(Vec<NamedListItem>, i64), sqlx::Error> {
    let mut count = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table} t WHERE TRUE"));
    push_name_filters(&mut count, "t", filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut query = QueryBuilder::new(format!(
        "SELECT t.id, t.name, t.modified FROM {table} t WHERE TRUE"
    ));
    push_name_filters(&mut query, "t", filter);
    query
        .push(" ORDER BY t.name, t.id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = query
        .build_query_as::<NamedListItem>()
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/// Mark a row as edited by `user_id`.
pub async fn touch(conn: &mut PgConnection, table: &str, id: i64, user_id: i64) -> Result<(), sqlx::Error> {
    let query = format!("UPDATE {table} SET edited_by = $2, modified = NOW() WHERE id = $1");
    sqlx::query(&query)
        .bind(id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("x_men"), "x\\_men");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("Batman"), "Batman");
    }

    #[test]
    fn contains_pattern_trims_and_escapes() {
        assert_eq!(contains_pattern("  50% Off "), "%50\\% Off%");
        assert_eq!(contains_pattern("spider"), "%spider%");
    }
}
