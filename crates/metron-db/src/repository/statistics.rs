//! Aggregation queries behind the statistics dashboard.

use metron_common::statistics::{CountBucket, PublisherCount, keys};
use sqlx::PgPool;

/// Table counted for a `*_total` cache key.
pub fn total_table(key: &str) -> Option<&'static str> {
    match key {
        keys::PUBLISHERS_TOTAL => Some("publishers"),
        keys::SERIES_TOTAL => Some("series"),
        keys::ISSUE_TOTAL => Some("issues"),
        keys::CHARACTERS_TOTAL => Some("characters"),
        keys::CREATORS_TOTAL => Some("creators"),
        keys::TEAMS_TOTAL => Some("teams"),
        keys::ARCS_TOTAL => Some("arcs"),
        _ => None,
    }
}

pub async fn count(pool: &PgPool, table: &'static str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
}

/// Issue count per publisher, including publishers without issues.
pub async fn publisher_issue_counts(pool: &PgPool) -> Result<Vec<PublisherCount>, sqlx::Error> {
    sqlx::query_as::<_, PublisherCount>(
        r#"
        SELECT p.name, COUNT(i.id) AS count
        FROM publishers p
        LEFT JOIN series s ON s.publisher_id = p.id
        LEFT JOIN issues i ON i.series_id = s.id
        GROUP BY p.id, p.name
        ORDER BY p.name
        "#,
    )
    .fetch_all(pool)
    .await
}

/// Truncation unit for [`created_buckets`].
#[derive(Debug, Clone, Copy)]
pub enum Bucket {
    Year,
    Month,
    Day,
}

impl Bucket {
    fn unit(self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Month => "month",
            Self::Day => "day",
        }
    }
}

/// Rows created per time bucket.
///
/// With a `limit`, the newest buckets come back newest first; without one, every bucket
/// comes back oldest first.
pub async fn created_buckets(
    pool: &PgPool,
    table: &'static str,
    bucket: Bucket,
    limit: Option<i64>,
) -> Result<Vec<CountBucket>, sqlx::Error> {
    let select = format!(
        "SELECT date_trunc('{unit}', created_on) AS bucket, COUNT(*) AS count \
         FROM {table} GROUP BY bucket",
        unit = bucket.unit()
    );
    match limit {
        Some(limit) => {
            sqlx::query_as::<_, CountBucket>(&format!("{select} ORDER BY bucket DESC LIMIT $1"))
                .bind(limit)
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query_as::<_, CountBucket>(&format!("{select} ORDER BY bucket"))
                .fetch_all(pool)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_total_key_maps_to_a_table() {
        for key in keys::TOTALS {
            assert!(total_table(key).is_some(), "{key}");
        }
        assert_eq!(total_table(keys::ISSUE_TOTAL), Some("issues"));
        assert_eq!(total_table(keys::PUBLISHERS), None);
    }
}
