//! Cache of encoded page previews

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use uuid::Uuid;

/// Identifies one rendered preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewKey {
    pub document: Uuid,
    pub page: usize,
    pub width: u32,
    pub height: u32,
}

struct CacheInner {
    lru: LruCache<PreviewKey, Vec<u8>>,
    total_bytes: usize,
}

/// PNG preview cache with entry count and byte budget limits
pub struct PreviewCache {
    inner: Mutex<CacheInner>,
    max_bytes: usize,
}

impl PreviewCache {
    /// Create a new cache with the specified entry capacity and byte budget
    pub fn new(capacity: usize, max_bytes: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner {
                lru: LruCache::new(capacity),
                total_bytes: 0,
            }),
            max_bytes,
        }
    }

    /// Store an encoded preview.
    /// Rejects entries larger than max_bytes entirely.
    /// Evicts LRU entries until byte budget is satisfied.
    pub fn put(&self, key: PreviewKey, data: Vec<u8>) {
        let new_size = data.len();

        if new_size > self.max_bytes {
            return;
        }

        let mut inner = self.inner.lock();

        if let Some(old) = inner.lru.pop(&key) {
            inner.total_bytes = inner.total_bytes.saturating_sub(old.len());
        }

        while inner.total_bytes + new_size > self.max_bytes {
            if let Some((_evicted_key, evicted_val)) = inner.lru.pop_lru() {
                inner.total_bytes = inner.total_bytes.saturating_sub(evicted_val.len());
            } else {
                break;
            }
        }

        // Capacity eviction inside `push` bypasses the byte accounting above
        if let Some((_, evicted_val)) = inner.lru.push(key, data) {
            inner.total_bytes = inner.total_bytes.saturating_sub(evicted_val.len());
        }
        inner.total_bytes += new_size;
    }

    pub fn get(&self, key: &PreviewKey) -> Option<Vec<u8>> {
        self.inner.lock().lru.get(key).cloned()
    }

    pub fn contains(&self, key: &PreviewKey) -> bool {
        self.inner.lock().lru.contains(key)
    }

    /// Drop every preview that does not belong to `document`
    pub fn retain_document(&self, document: Uuid) {
        let mut inner = self.inner.lock();
        let stale: Vec<PreviewKey> = inner
            .lru
            .iter()
            .filter(|(k, _)| k.document != document)
            .map(|(k, _)| *k)
            .collect();
        for key in stale {
            if let Some(val) = inner.lru.pop(&key) {
                inner.total_bytes = inner.total_bytes.saturating_sub(val.len());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().lru.is_empty()
    }

    /// Get total bytes currently stored in cache
    pub fn total_bytes(&self) -> usize {
        self.inner.lock().total_bytes
    }
}
