// ── Per-entity TTL cache ──
//
// Concurrent map from entity id to a value stamped with its insertion
// time. Expiry is checked lazily on read: an expired entry behaves like a
// miss and is replaced by the next `put`. Nothing sweeps in the
// background, and no entry is locked across a network round trip, so two
// concurrent misses may both fetch (last writer wins).

use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;
use tracing::trace;

/// Reference TTL for cached sub-resources.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.stored_at) > ttl
    }
}

/// Entry counts at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub expired: usize,
}

/// Process-lifetime cache keyed by a stable entity id.
///
/// The TTL is fixed per instance. Constructed once and shared via `Arc`.
#[derive(Debug)]
pub struct EntityCache<K: Eq + Hash, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
}

impl<K, V> EntityCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `id`, or `None` on a miss or an expired entry.
    pub fn get(&self, id: &K) -> Option<V> {
        let entry = self.entries.get(id)?;
        if entry.is_expired(Instant::now(), self.ttl) {
            trace!(?id, "cache entry expired");
            return None;
        }
        trace!(?id, "cache hit");
        Some(entry.value.clone())
    }

    pub fn put(&self, id: K, value: V) {
        self.entries.insert(
            id,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Drop the entry for `id`. Returns `true` if one existed.
    pub fn invalidate(&self, id: &K) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let total = self.entries.len();
        let expired = self
            .entries
            .iter()
            .filter(|e| e.value().is_expired(now, self.ttl))
            .count();
        CacheStats {
            total,
            fresh: total - expired,
            expired,
        }
    }
}

impl<K, V> Default for EntityCache<K, V>
where
    K: Eq + Hash + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
