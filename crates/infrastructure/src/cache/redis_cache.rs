//! Redis cache implementation
//!
//! Shares cached resources between processes. Every write stores the value
//! twice: under the fresh key with the configured TTL and under a shadow
//! `stale:` key that lives `stale_retention_factor` times longer, so stale
//! reads keep working after the fresh copy expired.
//!
//! Transport errors never leave this module: reads degrade to misses and
//! writes to no-ops, each logged at `warn`.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::ports::{CachePort, CacheStats};
use async_trait::async_trait;
use deadpool_redis::{
    Pool, PoolConfig, Runtime, Timeouts,
    redis::{self, AsyncCommands},
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Namespace for shadow copies, placed after the key prefix
const STALE_NAMESPACE: &str = "stale:";

/// SCAN batch size hint
const SCAN_COUNT: usize = 100;

/// Errors raised by the Redis backend
#[derive(Debug, Error)]
pub enum CacheBackendError {
    /// Pool could not be built from the configuration
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    /// No connection could be checked out of the pool
    #[error("Redis pool error: {0}")]
    Pool(String),

    /// Command failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Server answered PING with something unexpected
    #[error("Unexpected PING reply: {0}")]
    UnexpectedReply(String),

    /// Key prefix is empty, so key scans would cover the whole database
    #[error("Redis key prefix must not be empty")]
    EmptyKeyPrefix,
}

impl From<deadpool_redis::PoolError> for CacheBackendError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        Self::Pool(e.to_string())
    }
}

/// Configuration for the Redis cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisCacheConfig {
    /// Connection URL, e.g. `redis://127.0.0.1:6379`
    pub url: String,
    /// Prefix applied to every key
    pub key_prefix: String,
    /// TTL applied to every write
    pub ttl: Duration,
    /// Maximum pooled connections
    pub pool_size: usize,
    /// Timeout for checking out and creating connections
    pub connect_timeout: Duration,
    /// Shadow copies live this many times longer than the TTL
    pub stale_retention_factor: u32,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "autoreply:".to_string(),
            ttl: Duration::from_secs(3600),
            pool_size: 4,
            connect_timeout: Duration::from_secs(2),
            stale_retention_factor: 24,
        }
    }
}

impl RedisCacheConfig {
    /// Redis key holding the fresh copy
    pub fn fresh_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    /// Redis key holding the shadow copy
    pub fn stale_key(&self, key: &str) -> String {
        format!("{}{STALE_NAMESPACE}{key}", self.key_prefix)
    }

    /// `SCAN MATCH` pattern covering exactly the keys under the prefix
    fn scan_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.key_prefix.len() + 1);
        for c in self.key_prefix.chars() {
            if matches!(c, '\\' | '*' | '?' | '[' | ']') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('*');
        pattern
    }

    /// Expiry of the fresh copy in whole seconds (at least 1)
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs().max(1)
    }

    /// Expiry of the shadow copy in whole seconds
    pub fn stale_ttl_secs(&self) -> u64 {
        self.ttl_secs()
            .saturating_mul(u64::from(self.stale_retention_factor.max(1)))
    }
}

/// Redis-backed cache
pub struct RedisCache {
    pool: Pool,
    config: RedisCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.config.key_prefix)
            .field("ttl", &self.config.ttl)
            .field("pool", &self.pool.status())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Build the pool without touching the network
    pub fn new(config: RedisCacheConfig) -> Result<Self, CacheBackendError> {
        if config.key_prefix.is_empty() {
            return Err(CacheBackendError::EmptyKeyPrefix);
        }

        let timeouts = Timeouts {
            wait: Some(config.connect_timeout),
            create: Some(config.connect_timeout),
            recycle: Some(config.connect_timeout),
        };

        let mut pool_config = deadpool_redis::Config::from_url(config.url.clone());
        pool_config.pool = Some(PoolConfig {
            max_size: config.pool_size.max(1),
            timeouts,
            ..PoolConfig::default()
        });

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheBackendError::CreatePool(e.to_string()))?;

        Ok(Self {
            pool,
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    /// Build the pool and verify the server answers `PING`
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, CacheBackendError> {
        let cache = Self::new(config)?;
        cache.ping().await?;
        Ok(cache)
    }

    /// Round-trip a `PING`
    pub async fn ping(&self) -> Result<(), CacheBackendError> {
        let mut conn = self.pool.get().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheBackendError::UnexpectedReply(reply))
        }
    }

    /// Cache configuration
    pub const fn config(&self) -> &RedisCacheConfig {
        &self.config
    }

    async fn read(&self, redis_key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        let mut conn = self.pool.get().await?;
        let value: Option<Vec<u8>> = conn.get(redis_key).await?;
        Ok(value)
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), CacheBackendError> {
        let mut conn = self.pool.get().await?;
        let _: () = redis::pipe()
            .atomic()
            .set_ex(self.config.fresh_key(key), value, self.config.ttl_secs())
            .ignore()
            .set_ex(self.config.stale_key(key), value, self.config.stale_ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, CacheBackendError> {
        let mut conn = self.pool.get().await?;
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }

    async fn remove_all(&self) -> Result<usize, CacheBackendError> {
        let keys = self.scan(&self.config.scan_pattern()).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await?;
        let _: () = conn.del(&keys).await?;
        Ok(keys.len())
    }

    async fn fresh_keys(&self) -> Result<Vec<String>, CacheBackendError> {
        let prefix = &self.config.key_prefix;
        let stale_prefix = format!("{prefix}{STALE_NAMESPACE}");
        let mut keys: Vec<String> = self
            .scan(&self.config.scan_pattern())
            .await?
            .into_iter()
            .filter(|key| !key.starts_with(&stale_prefix))
            .filter_map(|key| key.strip_prefix(prefix.as_str()).map(str::to_string))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[async_trait]
impl CachePort for RedisCache {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        match self.read(&self.config.fresh_key(key)).await {
            Ok(Some(bytes)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                Some(bytes)
            },
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache miss");
                None
            },
            Err(e) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Redis read failed, treating as miss");
                None
            },
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_stale_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.read(&self.config.stale_key(key))
            .await
            .inspect_err(|e| warn!(key = %key, error = %e, "Redis stale read failed"))
            .ok()
            .flatten()
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_bytes(&self, key: &str, value: Vec<u8>) {
        match self.write(key, &value).await {
            Ok(()) => debug!(key = %key, "Cache set"),
            Err(e) => warn!(key = %key, error = %e, "Redis write failed, value not cached"),
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn clear(&self) {
        match self.remove_all().await {
            Ok(count) => debug!(count, "Cache cleared"),
            Err(e) => warn!(error = %e, "Redis clear failed"),
        }
    }

    async fn stats(&self) -> CacheStats {
        let keys = self.fresh_keys().await.unwrap_or_else(|e| {
            warn!(error = %e, "Redis key scan failed");
            Vec::new()
        });
        CacheStats {
            item_count: keys.len(),
            max_size: 0,
            ttl_secs: self.config.ttl.as_secs(),
            keys,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
