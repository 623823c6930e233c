//! In-memory TTL cache shared by search and featured rotation.
//!
//! One instance is constructed at startup and injected into every service
//! that needs it; there is no process-global state. Each `set` schedules a
//! tokio eviction task for its key, and an overwrite cancels the pending
//! task before installing its own (cancel-and-replace), so a fresh write is
//! never undone by a stale timer. Reads additionally check expiry lazily,
//! so an entry whose task has not fired yet still reads as absent.
//!
//! Absence is never an error: every cached value is recomputable from the
//! store, and callers fall back to recomputation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
    /// Monotonic write counter for this key. The eviction task only removes
    /// the entry if the generation it captured is still current, which
    /// closes the race where an already-woken timer outlives its abort.
    generation: u64,
}

struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    timers: HashMap<String, JoinHandle<()>>,
    next_generation: u64,
}

pub struct TtlCache<V> {
    inner: Arc<Mutex<Inner<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V>
where
    V: Clone + Send + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                timers: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the live value for `key`, treating an expired entry as
    /// absent and evicting it on the spot.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) => Instant::now() >= entry.expires_at,
            None => return None,
        };

        if expired {
            inner.entries.remove(key);
            if let Some(handle) = inner.timers.remove(key) {
                handle.abort();
            }
            return None;
        }

        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value` under `key` for `ttl`. Any pending eviction for the
    /// key is cancelled and replaced atomically under the cache lock.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let expires_at = Instant::now() + ttl;

        let mut inner = self.lock();
        let generation = inner.next_generation;
        inner.next_generation += 1;

        if let Some(handle) = inner.timers.remove(&key) {
            handle.abort();
        }
        inner.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                expires_at,
                generation,
            },
        );

        let weak: Weak<Mutex<Inner<V>>> = Arc::downgrade(&self.inner);
        let timer_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(expires_at).await;
            let Some(inner) = weak.upgrade() else { return };
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            let current = inner
                .entries
                .get(&timer_key)
                .is_some_and(|entry| entry.generation == generation);
            if current {
                inner.entries.remove(&timer_key);
                inner.timers.remove(&timer_key);
            }
        });
        inner.timers.insert(key, handle);
    }

    pub fn delete(&self, key: &str) {
        let mut inner = self.lock();
        inner.entries.remove(key);
        if let Some(handle) = inner.timers.remove(key) {
            handle.abort();
        }
    }

    /// Removes every key containing `pattern` as a substring.
    pub fn delete_pattern(&self, pattern: &str) {
        let mut inner = self.lock();
        let matching: Vec<String> = inner
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();
        for key in matching {
            inner.entries.remove(&key);
            if let Some(handle) = inner.timers.remove(&key) {
                handle.abort();
            }
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        for (_, handle) in inner.timers.drain() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let inner = self.lock();
        inner.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn get_within_ttl_returns_value() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(60));
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn get_after_ttl_returns_absent() {
        let cache: TtlCache<String> = TtlCache::new();
        cache.set("k", "v".to_string(), Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_cancels_pending_eviction() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("k", 1, Duration::from_secs(5));
        cache.set("k", 2, Duration::from_secs(60));

        // Past the first TTL, before the second: the stale timer must not
        // have undone the fresh write.
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_pattern_removes_exactly_matching_keys() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("search:ada", 1, Duration::from_secs(60));
        cache.set("search:alan", 2, Duration::from_secs(60));
        cache.set("featured:list", 3, Duration::from_secs(60));

        cache.delete_pattern("search:");

        assert_eq!(cache.get("search:ada"), None);
        assert_eq!(cache.get("search:alan"), None);
        assert_eq!(cache.get("featured:list"), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn delete_and_clear() {
        let cache: TtlCache<i32> = TtlCache::new();
        cache.set("a", 1, Duration::from_secs(60));
        cache.set("b", 2, Duration::from_secs(60));

        cache.delete("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));

        cache.clear();
        assert!(cache.is_empty());
    }

}
