//! Bounded in-memory cache with per-entry TTL
//!
//! Entries are evicted oldest-write-first once the capacity is reached.
//! Expired entries are kept until overwritten, evicted or cleared so the
//! loaders can fall back to them when the source is down.

use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use application::ports::{CachePort, CacheStats};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Default maximum number of entries
const DEFAULT_MAX_ENTRIES: usize = 10;

/// Default TTL for entries (1 hour)
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Configuration for the local cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTtlCacheConfig {
    /// Maximum number of entries, fresh or stale (at least 1)
    pub max_entries: usize,
    /// TTL applied to every write
    pub ttl: Duration,
}

impl Default for LocalTtlCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
struct Entries {
    by_key: HashMap<String, Entry>,
    // write sequence -> key, oldest first
    order: BTreeMap<u64, String>,
    next_seq: u64,
}

impl Entries {
    fn insert(&mut self, key: &str, value: Vec<u8>, expires_at: Instant, max_entries: usize) {
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(previous) = self.by_key.get(key) {
            self.order.remove(&previous.seq);
        } else {
            while self.by_key.len() >= max_entries {
                let Some((_, oldest)) = self.order.pop_first() else {
                    break;
                };
                self.by_key.remove(&oldest);
                debug!(key = %oldest, "Cache evicted oldest entry");
            }
        }

        self.order.insert(seq, key.to_string());
        self.by_key.insert(
            key.to_string(),
            Entry {
                value,
                expires_at,
                seq,
            },
        );
    }
}

/// In-process cache behind a single mutex
///
/// No `.await` happens while the lock is held.
pub struct LocalTtlCache {
    entries: Mutex<Entries>,
    config: LocalTtlCacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for LocalTtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTtlCache")
            .field("entries", &self.len())
            .field("max_entries", &self.config.max_entries)
            .field("ttl", &self.config.ttl)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

impl LocalTtlCache {
    /// Create a new cache with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LocalTtlCacheConfig::default())
    }

    /// Create a new cache with custom configuration
    #[must_use]
    pub fn with_config(config: LocalTtlCacheConfig) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            config: LocalTtlCacheConfig {
                max_entries: config.max_entries.max(1),
                ..config
            },
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Effective configuration
    pub const fn config(&self) -> LocalTtlCacheConfig {
        self.config
    }

    /// Number of retained entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.lock().by_key.len()
    }

    /// Whether nothing is retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for LocalTtlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CachePort for LocalTtlCache {
    #[instrument(skip(self), level = "debug")]
    async fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let value = self
            .entries
            .lock()
            .by_key
            .get(key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.value.clone());

        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Cache miss");
        }
        value
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_stale_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .by_key
            .get(key)
            .map(|entry| entry.value.clone())
    }

    #[instrument(skip(self, value), level = "debug")]
    async fn set_bytes(&self, key: &str, value: Vec<u8>) {
        let expires_at = Instant::now() + self.config.ttl;
        self.entries
            .lock()
            .insert(key, value, expires_at, self.config.max_entries);
        debug!(key = %key, "Cache set");
    }

    #[instrument(skip(self), level = "debug")]
    async fn clear(&self) {
        let mut entries = self.entries.lock();
        let count = entries.by_key.len();
        entries.by_key.clear();
        entries.order.clear();
        drop(entries);
        debug!(count, "Cache cleared");
    }

    async fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.entries.lock();
        let keys: Vec<String> = entries
            .order
            .values()
            .filter(|key| {
                entries
                    .by_key
                    .get(key.as_str())
                    .is_some_and(|entry| now < entry.expires_at)
            })
            .cloned()
            .collect();
        drop(entries);

        CacheStats {
            item_count: keys.len(),
            max_size: self.config.max_entries,
            ttl_secs: self.config.ttl.as_secs(),
            keys,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
