//! Cache implementations
//!
//! Two adapters implement the application's `CachePort`:
//! - `LocalTtlCache`: in-process map with TTL, bounded size and stale reads
//! - `RedisCache`: shared Redis backend with shadow copies for stale reads
//!
//! [`build_cache`] picks one from configuration.

mod local_ttl_cache;
mod redis_cache;

use std::sync::Arc;

use application::ports::CachePort;
use tracing::{info, warn};

pub use local_ttl_cache::{LocalTtlCache, LocalTtlCacheConfig};
pub use redis_cache::{CacheBackendError, RedisCache, RedisCacheConfig};

use crate::config::CacheConfig;

/// Build the configured cache backend
///
/// When the remote backend is enabled but cannot be reached, the local
/// cache is used for the rest of the process lifetime.
pub async fn build_cache(config: &CacheConfig) -> Arc<dyn CachePort> {
    if !config.remote.enabled {
        info!(
            max_entries = config.max_entries,
            ttl_secs = config.ttl_secs,
            "Using local cache"
        );
        return Arc::new(LocalTtlCache::with_config(config.local_config()));
    }

    match RedisCache::connect(config.remote_config()).await {
        Ok(cache) => {
            info!(prefix = %config.remote.key_prefix, "Using Redis cache");
            Arc::new(cache)
        },
        Err(e) => {
            warn!(error = %e, "Redis unavailable, falling back to local cache");
            Arc::new(LocalTtlCache::with_config(config.local_config()))
        },
    }
}
