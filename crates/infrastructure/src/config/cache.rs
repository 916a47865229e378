//! Cache configuration: local capacity/TTL and the optional Redis backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{LocalTtlCacheConfig, RedisCacheConfig};

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL in seconds applied to every cached resource (default: 1 hour)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of entries in the local cache
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Optional shared Redis backend
    #[serde(default)]
    pub remote: RemoteCacheConfig,
}

/// Redis backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCacheConfig {
    /// Use Redis instead of the local cache
    #[serde(default)]
    pub enabled: bool,

    /// Connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Prefix applied to every key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Maximum pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Connect and checkout timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Shadow copies for stale reads live this many times longer than the TTL
    #[serde(default = "default_stale_retention_factor")]
    pub stale_retention_factor: u32,
}

const fn default_ttl_secs() -> u64 {
    60 * 60 // 1 hour
}

const fn default_max_entries() -> usize {
    10
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_key_prefix() -> String {
    "autoreply:".to_string()
}

const fn default_pool_size() -> usize {
    4
}

const fn default_connect_timeout_secs() -> u64 {
    2
}

const fn default_stale_retention_factor() -> u32 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
            remote: RemoteCacheConfig::default(),
        }
    }
}

impl Default for RemoteCacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            pool_size: default_pool_size(),
            connect_timeout_secs: default_connect_timeout_secs(),
            stale_retention_factor: default_stale_retention_factor(),
        }
    }
}

impl CacheConfig {
    /// Get the TTL as a Duration
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Settings for the in-process cache
    #[must_use]
    pub const fn local_config(&self) -> LocalTtlCacheConfig {
        LocalTtlCacheConfig {
            max_entries: self.max_entries,
            ttl: self.ttl(),
        }
    }

    /// Settings for the Redis cache
    #[must_use]
    pub fn remote_config(&self) -> RedisCacheConfig {
        RedisCacheConfig {
            url: self.remote.url.clone(),
            key_prefix: self.remote.key_prefix.clone(),
            ttl: self.ttl(),
            pool_size: self.remote.pool_size,
            connect_timeout: Duration::from_secs(self.remote.connect_timeout_secs),
            stale_retention_factor: self.remote.stale_retention_factor,
        }
    }
}
