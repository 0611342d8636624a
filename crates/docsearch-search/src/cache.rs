//! Small bounded LRU caches: query results keyed by a composite tuple that
//! includes the index revision, and query-text to embedding-vector.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// A thread-safe LRU cache. Wraps `lru::LruCache` behind a `Mutex` since the
/// index manager may be probed concurrently by many readers.
pub struct BoundedCache<K: Eq + Hash, V: Clone> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Eq + Hash, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.lock().unwrap().get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        self.inner.lock().unwrap().put(key, value);
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Query cache capacity from §4.8: at most 256 entries.
pub const QUERY_CACHE_CAPACITY: usize = 256;
/// Embedding cache capacity from §4.8: at most 512 query strings.
pub const EMBEDDING_CACHE_CAPACITY: usize = 512;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_recently_used() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(2);
        cache.put(1, 10);
        cache.put(2, 20);
        cache.get(&1); // touch 1, making 2 the LRU entry
        cache.put(3, 30);
        assert_eq!(cache.get(&1), Some(10));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.get(&3), Some(30));
    }

    #[test]
    fn clear_empties_cache() {
        let cache: BoundedCache<u32, u32> = BoundedCache::new(4);
        cache.put(1, 10);
        cache.clear();
        assert!(cache.is_empty());
    }
}
