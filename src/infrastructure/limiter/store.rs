use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::{Config as RedisPoolConfig, Pool, Runtime};
use redis::AsyncCommands;
use tokio::time::sleep;
use url::Url;

use crate::errors::StoreError;

/// Keyed counters with expiry, the only shared state of the contact form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increments `key` and returns the new value.
    async fn incr(&self, key: &str) -> Result<u64, StoreError>;

    /// Sets `key` to expire after `ttl`.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    fn backend(&self) -> &'static str;
}

#[derive(Clone)]
pub struct RedisCounterStore {
    pool: Pool,
}

impl RedisCounterStore {
    /// Builds a lazily connecting pool. `token`, when given, replaces the
    /// password embedded in `url`.
    pub fn new(url: &str, token: Option<&str>) -> Result<Self, StoreError> {
        let url = with_token(url, token)?;
        let pool = RedisPoolConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(RedisCounterStore { pool })
    }
}

fn with_token(url: &str, token: Option<&str>) -> Result<String, StoreError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(url.to_string());
    };

    let mut parsed = Url::parse(url).map_err(|e| StoreError::Connection(e.to_string()))?;
    parsed
        .set_password(Some(token))
        .map_err(|_| StoreError::Connection("URL cannot carry credentials".into()))?;
    Ok(parsed.into())
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.pool.get().await?;
        let count: u64 = conn.incr(key, 1).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let _: bool = conn.expire(key, secs).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Operation(format!("unexpected PING reply: {pong}")))
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Counter {
    count: u64,
    expires_at: Option<Instant>,
}

impl Counter {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process counter store for single instance deployments.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    map: Arc<DashMap<String, Counter>>,
}

impl MemoryCounterStore {
    /// Creates the store and spawns the eviction sweep on the current runtime.
    /// The sweep stops once every handle to the store is dropped.
    pub fn new() -> Self {
        let store = Self::default();

        {
            let map = Arc::downgrade(&store.map);
            tokio::spawn(async move {
                let interval = Duration::from_secs(30);
                loop {
                    sleep(interval).await;
                    let Some(map) = map.upgrade() else {
                        break;
                    };
                    let now = Instant::now();
                    map.retain(|_, counter| !counter.is_expired(now));
                }
            });
        }

        store
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, StoreError> {
        let now = Instant::now();
        let mut entry = self.map.entry(key.to_string()).or_default();
        if entry.is_expired(now) {
            *entry = Counter::default();
        }
        entry.count += 1;
        Ok(entry.count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        if let Some(mut entry) = self.map.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn memory_store_counts_per_key() {
        let store = MemoryCounterStore::new();

        assert_eq!(store.incr("a").await.unwrap(), 1);
        assert_eq!(store.incr("a").await.unwrap(), 2);
        assert_eq!(store.incr("b").await.unwrap(), 1);
        assert_eq!(store.len(), 2);
    }

    #[actix_rt::test]
    async fn memory_store_resets_after_expiry() {
        let store = MemoryCounterStore::new();

        store.incr("k").await.unwrap();
        store.expire("k", Duration::from_millis(20)).await.unwrap();
        assert_eq!(store.incr("k").await.unwrap(), 2);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.incr("k").await.unwrap(), 1);
    }

    #[test]
    fn token_is_injected_as_password() {
        let url = with_token("redis://cache.internal:6379/0", Some("s3cret")).unwrap();
        assert_eq!(url, "redis://:s3cret@cache.internal:6379/0");

        let untouched = with_token("redis://localhost:6379", None).unwrap();
        assert_eq!(untouched, "redis://localhost:6379");
    }
}
