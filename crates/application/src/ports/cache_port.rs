//! Cache port definition
//!
//! Defines the interface for the resource cache shared by the loaders.
//! Implementations may keep entries in process memory or in a remote store
//! (Redis). Operations never fail outward: a backend problem reads as a miss
//! and a failed write is dropped.

use async_trait::async_trait;
use tracing::warn;

/// Cache port for storing and retrieving cached values
///
/// Implementations should be thread-safe and support async operations.
/// Values are stored as raw bytes - callers handle serialization. Every write
/// uses the cache's configured TTL.
#[async_trait]
pub trait CachePort: Send + Sync + std::fmt::Debug {
    /// Get a fresh value by key
    ///
    /// Returns `None` if the key was never written, has expired, was evicted
    /// or the backend failed.
    async fn get_bytes(&self, key: &str) -> Option<Vec<u8>>;

    /// Get the last stored value even if it has expired
    ///
    /// Returns `None` once the key is overwritten, evicted or cleared.
    async fn get_stale_bytes(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value with the configured TTL
    ///
    /// If the key already exists, its value and expiry are replaced.
    async fn set_bytes(&self, key: &str, value: Vec<u8>);

    /// Remove every entry, fresh and stale
    async fn clear(&self);

    /// Get cache statistics
    async fn stats(&self) -> CacheStats;
}

/// Extension trait for typed cache operations
///
/// Provides convenient typed get/set methods on top of the raw byte interface.
/// A payload that fails to decode is logged and treated as a miss.
#[async_trait]
pub trait CachePortExt: CachePort {
    /// Get a typed fresh value from cache
    async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        let bytes = self.get_bytes(key).await?;
        decode(key, &bytes)
    }

    /// Get a typed value from cache, ignoring expiry
    async fn get_stale<T>(&self, key: &str) -> Option<T>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        let bytes = self.get_stale_bytes(key).await?;
        decode(key, &bytes)
    }

    /// Set a typed value in cache
    async fn set<T>(&self, key: &str, value: &T)
    where
        T: serde::Serialize + Send + Sync,
    {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set_bytes(key, bytes).await,
            Err(e) => warn!(key, error = %e, "Cache serialization error, value not stored"),
        }
    }
}

// Blanket implementation for all CachePort implementors
impl<T: CachePort + ?Sized> CachePortExt for T {}

fn decode<T: serde::de::DeserializeOwned>(key: &str, bytes: &[u8]) -> Option<T> {
    serde_json::from_slice(bytes)
        .inspect_err(|e| warn!(key, error = %e, "Cache deserialization error, treating as miss"))
        .ok()
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of fresh entries
    pub item_count: usize,
    /// Capacity (0 when the backend is unbounded)
    pub max_size: usize,
    /// TTL applied to every write
    pub ttl_secs: u64,
    /// Keys of the fresh entries
    pub keys: Vec<String>,
    /// Number of fresh-read hits
    pub hits: u64,
    /// Number of fresh-read misses
    pub misses: u64,
}

impl CacheStats {
    /// Calculate the hit rate as a percentage (0.0 - 1.0)
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            // Precision loss is acceptable for statistics display
            self.hits as f64 / total as f64
        }
    }
}

/// Cache keys of the loaded resources
pub mod keys {
    /// Knowledge base snapshot
    pub const KNOWLEDGE_BASE: &str = "knowledge_base";

    /// Replacement rule set
    pub const REPLACEMENTS: &str = "replacements";
}
