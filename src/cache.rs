//! In-memory TTL caches for discovery and feed results.
//!
//! Built on [`lru::LruCache`] with a per-entry expiry deadline. Reads use
//! `peek` and never promote an entry, so capacity overflow evicts the
//! least-recently-*inserted* entry rather than the least-recently-used one.
//! Expired entries are dropped on access; there is no background sweeper.
//!
//! Deadlines use [`tokio::time::Instant`] so TTL behavior is observable in
//! tests running under a paused runtime clock.

use lru::LruCache;
use std::hash::Hash;
use std::num::NonZeroUsize;
use tokio::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Capacity-bounded cache whose entries expire after a fixed TTL.
///
/// Not internally synchronized — callers wrap it in a mutex when shared
/// across request handlers.
pub struct TtlCache<K: Hash + Eq, V> {
    entries: LruCache<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// Creates a cache holding at most `capacity` entries, each valid for
    /// `ttl` after insertion. A zero capacity is clamped to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    /// Returns a clone of the cached value, or `None` if absent or past its
    /// TTL. An expired entry is removed on the spot.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let expired = match self.entries.peek(key) {
            Some(entry) => entry.expires_at <= Instant::now(),
            None => return None,
        };

        if expired {
            self.entries.pop(key);
            return None;
        }

        self.entries.peek(key).map(|entry| entry.value.clone())
    }

    /// Inserts a value, stamping its expiry at `now + ttl`. Evicts the
    /// oldest-inserted entry when the capacity bound is hit.
    pub fn insert(&mut self, key: K, value: V) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.push(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl_secs: u64) -> TtlCache<String, String> {
        TtlCache::new(capacity, Duration::from_secs(ttl_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let mut c = cache(10, 60);
        c.insert("a".into(), "value".into());

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(c.get(&"a".to_string()), Some("value".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_dropped() {
        let mut c = cache(10, 60);
        c.insert("a".into(), "value".into());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(c.get(&"a".to_string()), None);
        assert!(c.is_empty(), "expired entry should be removed on access");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reinsert_refreshes_ttl() {
        let mut c = cache(10, 60);
        c.insert("a".into(), "old".into());

        tokio::time::advance(Duration::from_secs(40)).await;
        c.insert("a".into(), "new".into());

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(c.get(&"a".to_string()), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_inserted() {
        let mut c = cache(2, 3600);
        c.insert("a".into(), "1".into());
        c.insert("b".into(), "2".into());
        c.insert("c".into(), "3".into());

        assert_eq!(c.get(&"a".to_string()), None, "oldest entry evicted");
        assert_eq!(c.get(&"b".to_string()), Some("2".to_string()));
        assert_eq!(c.get(&"c".to_string()), Some("3".to_string()));
        assert_eq!(c.len(), 2);
    }

    #[tokio::test]
    async fn test_reads_do_not_refresh_eviction_order() {
        let mut c = cache(2, 3600);
        c.insert("a".into(), "1".into());
        c.insert("b".into(), "2".into());

        // A read of "a" must not save it from eviction.
        assert_eq!(c.get(&"a".to_string()), Some("1".to_string()));
        c.insert("c".into(), "3".into());

        assert_eq!(c.get(&"a".to_string()), None);
        assert_eq!(c.get(&"b".to_string()), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_zero_capacity_clamped() {
        let mut c = cache(0, 3600);
        c.insert("a".into(), "1".into());
        assert_eq!(c.get(&"a".to_string()), Some("1".to_string()));
    }
}
