//! Key/value cache with per-key expiry.
//!
//! Backed by Redis when a URL is configured, otherwise by an in-process map. Values are
//! JSON strings either way, so both backends hold exactly the same data.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Clone)]
pub enum Cache {
    Redis(ConnectionManager),
    Memory(MemoryCache),
}

/// In-process fallback. Expired entries are dropped lazily on read.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires)) if *expires > Instant::now() => {
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        self.entries.write().await.remove(key);
        None
    }

    async fn set_ex(&self, key: &str, value: String, ttl_secs: u64) {
        let expires = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, expires));
    }
}

impl Cache {
    pub fn redis(manager: ConnectionManager) -> Self {
        Self::Redis(manager)
    }

    pub fn memory() -> Self {
        Self::Memory(MemoryCache::default())
    }

    /// Get a raw value by key.
    pub async fn get(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        match self {
            Self::Redis(conn) => conn.clone().get(key).await,
            Self::Memory(mem) => Ok(mem.get(key).await),
        }
    }

    /// Set a key with expiration.
    pub async fn set_ex(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), redis::RedisError> {
        match self {
            Self::Redis(conn) => conn.clone().set_ex(key, value, ttl_secs).await,
            Self::Memory(mem) => {
                mem.set_ex(key, value, ttl_secs).await;
                Ok(())
            }
        }
    }

    /// Fetch several keys in one round trip. Missing keys come back as `None`.
    pub async fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>, redis::RedisError> {
        match self {
            Self::Redis(conn) => {
                if keys.is_empty() {
                    return Ok(Vec::new());
                }
                conn.clone().mget(keys).await
            }
            Self::Memory(mem) => {
                let mut values = Vec::with_capacity(keys.len());
                for key in keys {
                    values.push(mem.get(key).await);
                }
                Ok(values)
            }
        }
    }

    /// Get and decode a JSON value. Undecodable values count as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, redis::RedisError> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        Ok(decode(key, &raw))
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) -> Result<(), redis::RedisError> {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_ex(key, raw, ttl_secs).await,
            Err(e) => {
                tracing::warn!(key, error = %e, "Skipping cache write for unserializable value");
                Ok(())
            }
        }
    }

    /// Read-through: return the cached value, or compute, store and return it.
    pub async fn get_or_compute<T, E, F, Fut>(&self, key: &str, ttl_secs: u64, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<redis::RedisError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get_json(key).await? {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }
        tracing::debug!(key, "cache miss");
        let value = compute().await?;
        self.set_json(key, &value, ttl_secs).await?;
        Ok(value)
    }
}

/// Decode a cached JSON value, logging and discarding anything malformed.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = Cache::memory();
        cache.set_ex("issue_total", "42".into(), 1800).await.unwrap();
        assert_eq!(cache.get("issue_total").await.unwrap().as_deref(), Some("42"));

        tokio::time::advance(Duration::from_secs(1799)).await;
        assert!(cache.get("issue_total").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("issue_total").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn read_through_recomputes_after_expiry() {
        let cache = Cache::memory();
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let compute = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<i64, redis::RedisError>(7)
        };

        assert_eq!(cache.get_or_compute("arcs_total", 60, compute).await.unwrap(), 7);
        assert_eq!(cache.get_or_compute("arcs_total", 60, compute).await.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.get_or_compute("arcs_total", 60, compute).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_many_keeps_key_order() {
        let cache = Cache::memory();
        cache.set_json("a", &1, 60).await.unwrap();
        cache.set_json("c", &3, 60).await.unwrap();
        let values = cache.get_many(&["a", "b", "c"]).await.unwrap();
        assert_eq!(values, vec![Some("1".into()), None, Some("3".into())]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_miss() {
        let cache = Cache::memory();
        cache.set_ex("publishers", "{not json".into(), 60).await.unwrap();
        let value: Option<Vec<String>> = cache.get_json("publishers").await.unwrap();
        assert!(value.is_none());
    }
}
