use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Session-scoped key-value cache with per-entry expiry
///
/// Only a latency optimization; callers must treat a miss or an error as
/// "unknown" and fall back to the store.
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    expires_at: Instant,
}

impl CachedValue {
    fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// In-memory session cache backed by moka
#[derive(Clone)]
pub struct MemorySessionCache {
    entries: moka::future::Cache<String, CachedValue>,
}

impl MemorySessionCache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            entries: moka::future::CacheBuilder::new(max_entries).build(),
        }
    }
}

impl Default for MemorySessionCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.entries.get(key).await {
            Some(entry) if entry.is_live() => Ok(Some(entry.value)),
            Some(_) => {
                self.entries.invalidate(key).await;
                tracing::trace!("Session cache expired: {}", key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.entries
            .insert(key.to_string(), CachedValue::new(value, ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.invalidate(key).await;
        Ok(())
    }
}

/// Two-tier session cache
///
/// L1 is an in-process moka cache, L2 is Redis so a session survives a
/// restart or a hop to another instance. Both tiers honour the entry's TTL.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: MemorySessionCache,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(redis_url: &str, l1_size: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache: MemorySessionCache::new(l1_size),
        })
    }
}

#[async_trait]
impl SessionCache for CacheManager {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        if let Some(value) = self.l1_cache.get(key).await? {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(value));
        }

        let mut conn = self.redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        let remaining_ms: i64 = redis::cmd("PTTL")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        match value {
            Some(value) if remaining_ms > 0 => {
                tracing::trace!("L2 cache hit: {}", key);
                let ttl = Duration::from_millis(remaining_ms as u64);
                self.l1_cache.set(key, value.clone(), ttl).await?;
                Ok(Some(value))
            }
            _ => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.l1_cache.set(key, value.clone(), ttl).await?;

        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl.as_secs().max(1))
            .arg(value)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.delete(key).await?;
        let mut conn = self.redis.lock().await;
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key mirroring a sender's active contact request
    pub fn active_request(sender_id: &str) -> String {
        format!("contact:active:{}", sender_id)
    }
}
