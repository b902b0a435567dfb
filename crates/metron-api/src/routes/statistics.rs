//! Statistics dashboard.
//!
//! Every figure lives in the cache under its own key for `cache.ttl_secs`. The main
//! endpoint reads through the cache; the fragment endpoints recompute and overwrite.

use axum::{Json, Router, extract::State, middleware, routing::get};
use chrono::{DateTime, Utc};
use metron_common::{
    error::{MetronError, MetronResult},
    statistics::{ChartData, Charts, StatisticsResponse, Totals, keys},
};
use metron_db::{
    cache::{self, Cache},
    repository::statistics::{self as stats, Bucket},
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/statistics", get(statistics))
        .route("/statistics/totals", get(refresh_totals))
        .route("/statistics/charts", get(refresh_charts))
        .route_layer(middleware::from_fn(crate::middleware::auth_middleware))
}

/// Whether a cached value may be served or must be recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Freshness {
    ReadThrough,
    Refresh,
}

/// Reads or refreshes cached figures with one expiry.
pub(crate) struct Loader<'a> {
    cache: &'a Cache,
    freshness: Freshness,
    ttl_secs: u64,
}

impl<'a> Loader<'a> {
    pub(crate) fn new(cache: &'a Cache, freshness: Freshness) -> Self {
        Self {
            cache,
            freshness,
            ttl_secs: metron_common::config::get().cache.ttl_secs,
        }
    }

    pub(crate) async fn load<T, F, Fut>(&self, key: &str, compute: F) -> MetronResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        let compute = move || async move { compute().await.map_err(MetronError::from) };
        match self.freshness {
            Freshness::ReadThrough => self.cache.get_or_compute(key, self.ttl_secs, compute).await,
            Freshness::Refresh => {
                let value = compute().await?;
                self.cache.set_json(key, &value, self.ttl_secs).await?;
                tracing::info!(key, "Cache entry refreshed");
                Ok(value)
            }
        }
    }

    /// The seven totals. On read-through they are fetched in one round trip and only
    /// the missing ones are counted.
    async fn totals(&self, pool: &PgPool) -> MetronResult<Totals> {
        let cached = match self.freshness {
            Freshness::ReadThrough => self.cache.get_many(&keys::TOTALS).await?,
            Freshness::Refresh => vec![None; keys::TOTALS.len()],
        };

        let mut counts = [0i64; 7];
        for (slot, (key, raw)) in counts.iter_mut().zip(keys::TOTALS.iter().zip(cached)) {
            if let Some(hit) = raw.and_then(|raw| cache::decode::<i64>(key, &raw)) {
                *slot = hit;
                continue;
            }
            let table = stats::total_table(key)
                .ok_or_else(|| MetronError::Internal(anyhow::anyhow!("no table for {key}")))?;
            let count = stats::count(pool, table).await?;
            self.cache.set_json(key, &count, self.ttl_secs).await?;
            *slot = count;
        }
        Ok(Totals::from_counts(counts))
    }

    async fn chart_data(&self, pool: &PgPool) -> MetronResult<ChartData> {
        Ok(ChartData {
            publishers: self
                .load(keys::PUBLISHERS, || stats::publisher_issue_counts(pool))
                .await?,
            yearly: self
                .load(keys::YEAR_COUNT, || {
                    stats::created_buckets(pool, "issues", Bucket::Year, None)
                })
                .await?,
            monthly: self
                .load(keys::MONTHLY_ISSUES, || {
                    stats::created_buckets(pool, "issues", Bucket::Month, Some(12))
                })
                .await?,
            daily: self
                .load(keys::DAILY_ISSUES, || {
                    stats::created_buckets(pool, "issues", Bucket::Day, Some(30))
                })
                .await?,
            creators: self
                .load(keys::CREATORS, || {
                    stats::created_buckets(pool, "creators", Bucket::Month, Some(12))
                })
                .await?,
            characters: self
                .load(keys::CHARACTERS, || {
                    stats::created_buckets(pool, "characters", Bucket::Month, Some(12))
                })
                .await?,
        })
    }
}

/// GET /api/v1/statistics
async fn statistics(State(state): State<Arc<AppState>>) -> MetronResult<Json<StatisticsResponse>> {
    let loader = Loader::new(&state.db.cache, Freshness::ReadThrough);
    let update_time: DateTime<Utc> = loader
        .load(keys::STATS_UPDATE_TIME, || async { Ok(Utc::now()) })
        .await?;
    let totals = loader.totals(&state.db.pool).await?;
    let charts = Charts::from(&loader.chart_data(&state.db.pool).await?);

    Ok(Json(StatisticsResponse {
        update_time,
        totals,
        charts,
    }))
}

/// GET /api/v1/statistics/totals
async fn refresh_totals(State(state): State<Arc<AppState>>) -> MetronResult<Json<Totals>> {
    let loader = Loader::new(&state.db.cache, Freshness::Refresh);
    Ok(Json(loader.totals(&state.db.pool).await?))
}

/// GET /api/v1/statistics/charts
async fn refresh_charts(State(state): State<Arc<AppState>>) -> MetronResult<Json<Charts>> {
    let loader = Loader::new(&state.db.cache, Freshness::Refresh);
    let data = loader.chart_data(&state.db.pool).await?;
    Ok(Json(Charts::from(&data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn loader(cache: &Cache, freshness: Freshness) -> Loader<'_> {
        Loader {
            cache,
            freshness,
            ttl_secs: 1800,
        }
    }

    #[tokio::test]
    async fn read_through_serves_cached_value() {
        let cache = Cache::memory();
        cache.set_json(keys::ARCS_TOTAL, &5i64, 60).await.unwrap();

        let value: i64 = loader(&cache, Freshness::ReadThrough)
            .load(keys::ARCS_TOTAL, || async { Ok(99) })
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn refresh_recomputes_and_overwrites() {
        let cache = Cache::memory();
        cache.set_json(keys::ARCS_TOTAL, &5i64, 60).await.unwrap();
        let counter = AtomicI64::new(0);
        let calls = &counter;

        let value: i64 = loader(&cache, Freshness::Refresh)
            .load(keys::ARCS_TOTAL, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stored: Option<i64> = cache.get_json(keys::ARCS_TOTAL).await.unwrap();
        assert_eq!(stored, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn cached_figures_expire_after_thirty_minutes() {
        let cache = Cache::memory();
        let first: i64 = loader(&cache, Freshness::ReadThrough)
            .load(keys::SERIES_TOTAL, || async { Ok(1) })
            .await
            .unwrap();
        assert_eq!(first, 1);

        tokio::time::advance(std::time::Duration::from_secs(1801)).await;
        let second: i64 = loader(&cache, Freshness::ReadThrough)
            .load(keys::SERIES_TOTAL, || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(second, 2);
    }
}
