use metron_common::models::{NameFilter, Role};
use sqlx::{PgPool, QueryBuilder};

use super::contains_pattern;

/// Credit roles in display order.
pub async fn list(pool: &PgPool, filter: &NameFilter) -> Result<Vec<Role>, sqlx::Error> {
    let mut query = QueryBuilder::new(
        r#"SELECT r.id, r.name, r."order", r.notes, r.modified FROM roles r WHERE TRUE"#,
    );
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        query.push(" AND r.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(modified) = filter.modified_gt {
        query.push(" AND r.modified > ").push_bind(modified);
    }
    query.push(r#" ORDER BY r."order", r.name"#);
    query.build_query_as::<Role>().fetch_all(pool).await
}

/// How many of `ids` exist.
pub async fn count_existing(pool: &PgPool, ids: &[i64]) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE id = ANY($1)")
        .bind(ids)
        .fetch_one(pool)
        .await
}
