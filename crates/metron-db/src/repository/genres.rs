use metron_common::models::{Genre, NameFilter};
use sqlx::{PgPool, QueryBuilder};

use super::contains_pattern;

/// Genres are a seeded list, returned whole like series types.
pub async fn list(pool: &PgPool, filter: &NameFilter) -> Result<Vec<Genre>, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT g.id, g.name, g.description, g.modified FROM genres g WHERE TRUE");
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        query.push(" AND g.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(modified) = filter.modified_gt {
        query.push(" AND g.modified > ").push_bind(modified);
    }
    query.push(" ORDER BY g.name");
    query.build_query_as::<Genre>().fetch_all(pool).await
}
