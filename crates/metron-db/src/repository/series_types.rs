use metron_common::models::{NameFilter, SeriesType};
use sqlx::{PgPool, QueryBuilder};

use super::contains_pattern;

/// Series types are a short seeded list, so the whole filtered set comes back at once.
pub async fn list(pool: &PgPool, filter: &NameFilter) -> Result<Vec<SeriesType>, sqlx::Error> {
    let mut query = QueryBuilder::new("SELECT t.id, t.name, t.notes, t.modified FROM series_types t WHERE TRUE");
    if let Some(name) = filter.name.as_deref().filter(|n| !n.trim().is_empty()) {
        query.push(" AND t.name ILIKE ").push_bind(contains_pattern(name));
    }
    if let Some(modified) = filter.modified_gt {
        query.push(" AND t.modified > ").push_bind(modified);
    }
    query.push(" ORDER BY t.name");
    query.build_query_as::<SeriesType>().fetch_all(pool).await
}
