//! In-memory cache fake for service tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ports::{CachePort, CacheStats};

#[derive(Debug, Default)]
struct Slot {
    value: Vec<u8>,
    fresh: bool,
}

/// Unbounded cache whose entries only expire when a test says so
#[derive(Debug, Default)]
pub struct FakeCache {
    entries: Mutex<HashMap<String, Slot>>,
}

impl FakeCache {
    /// Mark every entry as expired, keeping it for stale reads
    pub fn expire_all(&self) {
        for slot in self.entries.lock().values_mut() {
            slot.fresh = false;
        }
    }

    /// Whether a key is present, fresh or stale
    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains_key(key)
    }
}

#[async_trait]
impl CachePort for FakeCache {
    async fn get_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .get(key)
            .filter(|slot| slot.fresh)
            .map(|slot| slot.value.clone())
    }

    async fn get_stale_bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).map(|slot| slot.value.clone())
    }

    async fn set_bytes(&self, key: &str, value: Vec<u8>) {
        self.entries
            .lock()
            .insert(key.to_string(), Slot { value, fresh: true });
    }

    async fn clear(&self) {
        self.entries.lock().clear();
    }

    async fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut keys: Vec<_> = entries
            .iter()
            .filter(|(_, slot)| slot.fresh)
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        CacheStats {
            item_count: keys.len(),
            keys,
            ..CacheStats::default()
        }
    }
}
