//! Infrastructure layer - Adapters for external systems
//!
//! Implements the cache port (in-process and Redis), loads configuration
//! and installs logging.

pub mod cache;
pub mod config;
pub mod telemetry;
#[cfg(test)]
pub mod testing;

pub use cache::{
    CacheBackendError, LocalTtlCache, LocalTtlCacheConfig, RedisCache, RedisCacheConfig,
    build_cache,
};
pub use config::{
    AdmissionAppConfig, AppConfig, CacheConfig, KnowledgeBaseAppConfig, RemoteCacheConfig,
    SheetsConfig, SuspensionAppConfig,
};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
