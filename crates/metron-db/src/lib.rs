//! # metron-db
//!
//! Database layer for Metron. Manages:
//! - **PostgreSQL**: the catalog itself (relational data, join tables, credits)
//! - **Cache**: statistics and home feed, in Redis when configured, otherwise in-process

pub mod cache;
pub mod postgres;
pub mod repository;

use anyhow::Result;
use sqlx::PgPool;

use cache::Cache;

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pool: PgPool,
    pub cache: Cache,
}

impl Database {
    /// Connect to PostgreSQL and the configured cache backend.
    pub async fn connect(config: &metron_common::config::AppConfig) -> Result<Self> {
        tracing::info!("Connecting to PostgreSQL...");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect(&config.database.url)
            .await?;
        tracing::info!("Connected to PostgreSQL");

        let cache = match config.redis.url.as_deref() {
            Some(url) => {
                tracing::info!("Connecting to Redis...");
                let client = redis::Client::open(url)?;
                let manager = redis::aio::ConnectionManager::new(client).await?;
                tracing::info!("Connected to Redis");
                Cache::redis(manager)
            }
            None => {
                tracing::info!("No Redis configured, using in-process cache");
                Cache::memory()
            }
        };

        Ok(Self { pool, cache })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }
}
