use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

use super::byte_view::ByteView;
use super::lru::LruCache;

/// Hook run for every entry evicted from a [`GuardedStore`]. It is invoked
/// after the store mutex has been released.
pub type EvictionHook = Arc<dyn Fn(&str, &ByteView) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entries: usize,
    pub bytes: usize,
}

/// Mutex-serialized LRU of [`ByteView`]s, allocated on first insert.
pub struct GuardedStore {
    cache_bytes: usize,
    lru: Mutex<Option<LruCache<ByteView>>>,
    on_evicted: Option<EvictionHook>,
}

impl GuardedStore {
    pub fn new(cache_bytes: usize) -> Self {
        Self::with_eviction_hook(cache_bytes, None)
    }

    pub fn with_eviction_hook(cache_bytes: usize, on_evicted: Option<EvictionHook>) -> Self {
        Self {
            cache_bytes,
            lru: Mutex::new(None),
            on_evicted,
        }
    }

    pub fn add(&self, key: &str, value: ByteView) {
        let evicted = {
            let mut guard = self.lru.lock();
            let lru = guard.get_or_insert_with(|| LruCache::new(self.cache_bytes, None));
            lru.insert(key.to_string(), value)
        };

        if let Some(hook) = &self.on_evicted {
            for (key, value) in &evicted {
                hook(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.lru.lock();
        guard.as_mut()?.get(key).cloned()
    }

    pub fn stats(&self) -> StoreStats {
        let guard = self.lru.lock();
        guard
            .as_ref()
            .map(|lru| StoreStats {
                entries: lru.len(),
                bytes: lru.bytes(),
            })
            .unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        self.lru.lock().is_some()
    }

    pub fn cache_bytes(&self) -> usize {
        self.cache_bytes
    }
}
