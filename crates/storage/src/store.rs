//! Ephemeral TTL-backed key-value store shared by the idempotency guard and
//! the standings cache. Redis is the preferred backend for cross-process
//! correctness; when it is not configured or unreachable at startup the
//! process degrades to a local in-memory map. The local backend is correct
//! only within a single instance -- callers that need to survive a flapping
//! Redis keep their own [`MemoryStore`] fallback and never branch on which
//! backend they were given.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait TtlStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
    /// Atomically store `value` unless a live record already exists.
    /// Returns true when the write happened.
    async fn put_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, StoreError>;
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local map with explicit expiry timestamps checked on every access.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TtlStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().expect("memory store poisoned");
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("memory store poisoned");
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().expect("memory store poisoned");
        let now = Instant::now();
        if let Some((_, expires_at)) = entries.get(key)
            && *expires_at > now
        {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), now + ttl));
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("memory store poisoned");
        entries.remove(key);
        Ok(())
    }
}

/// Shared backend. The connection manager reconnects on its own; individual
/// command failures are surfaced so callers can degrade per operation.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let mut manager = client.get_connection_manager().await?;
        let _: String = redis::cmd("PING").query_async(&mut manager).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl TtlStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.manager.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }
}

/// Pick the backend at startup. The degrade to the in-process map trades
/// cross-instance correctness for availability, so it is logged loudly.
pub async fn connect(redis_url: Option<&str>) -> Arc<dyn TtlStore> {
    if let Some(url) = redis_url {
        match RedisStore::connect(url).await {
            Ok(store) => {
                tracing::info!("Ephemeral store backed by Redis");
                return Arc::new(store);
            }
            Err(err) => {
                tracing::warn!(
                    "Redis connection failed: {err} -- falling back to in-memory store \
                     (idempotency and cache coherence are per-instance only)"
                );
            }
        }
    } else {
        tracing::info!("REDIS_URL not set -- using in-memory ephemeral store");
    }
    Arc::new(MemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_roundtrip_and_delete() {
        let store = MemoryStore::new();
        store
            .put("k", "v", Duration::from_secs(60))
            .await
            .expect("put");
        assert_eq!(store.get("k").await.expect("get"), Some("v".to_string()));

        store.delete("k").await.expect("delete");
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn memory_store_expires_entries_on_read() {
        let store = MemoryStore::new();
        store
            .put("k", "v", Duration::from_millis(5))
            .await
            .expect("put");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn put_if_absent_respects_live_records() {
        let store = MemoryStore::new();
        assert!(
            store
                .put_if_absent("k", "first", Duration::from_secs(60))
                .await
                .expect("first claim")
        );
        assert!(
            !store
                .put_if_absent("k", "second", Duration::from_secs(60))
                .await
                .expect("second claim")
        );
        assert_eq!(
            store.get("k").await.expect("get"),
            Some("first".to_string())
        );
    }

    #[tokio::test]
    async fn put_if_absent_reclaims_expired_records() {
        let store = MemoryStore::new();
        assert!(
            store
                .put_if_absent("k", "first", Duration::from_millis(5))
                .await
                .expect("first claim")
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(
            store
                .put_if_absent("k", "second", Duration::from_secs(60))
                .await
                .expect("reclaim")
        );
    }
}
