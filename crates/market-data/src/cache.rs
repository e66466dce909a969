//! In-memory TTL cache for upstream responses.
//!
//! Entries carry their own expiry instant. There is no capacity bound and no
//! background sweep: an expired entry is dropped the next time it is read.
//! Time comes from an injected [`Clock`] so tests can move it forward.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Source of monotonic time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|p| p.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().unwrap_or_else(|p| p.into_inner());
        self.base + *offset
    }
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Keyed store mapping a request signature to a value plus expiry instant.
///
/// Concurrent `set` on the same key is last-write-wins. Two concurrent misses
/// both go upstream.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Lock the entries mutex, recovering from poison if necessary.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return the live value for `key`, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        match entries.get(key) {
            Some(entry) if now <= entry.expires_at => {
                debug!("Cache HIT {}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache EXPIRED {}", key);
                entries.remove(key);
                None
            }
            None => {
                debug!("Cache MISS {}", key);
                None
            }
        }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        let mut entries = self.lock_entries();
        entries.insert(key.into(), CacheEntry { value, expires_at });
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_cache() -> (Arc<ManualClock>, TtlCache<i32>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(clock.clone());
        (clock, cache)
    }

    #[test]
    fn test_cache_get_set() {
        let (_clock, cache) = manual_cache();

        assert!(cache.get("key1").is_none());

        cache.set("key1", 123, Duration::from_secs(30));
        assert_eq!(cache.get("key1"), Some(123));

        assert!(cache.get("key2").is_none());
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (clock, cache) = manual_cache();
        cache.set("quote:AAPL", 1, Duration::from_secs(30));

        clock.advance(Duration::from_secs(29));
        assert_eq!(cache.get("quote:AAPL"), Some(1));

        clock.advance(Duration::from_secs(2));
        assert!(cache.get("quote:AAPL").is_none());
    }

    #[test]
    fn test_expired_entry_is_evicted_on_read_only() {
        let (clock, cache) = manual_cache();
        cache.set("a", 1, Duration::from_secs(1));
        cache.set("b", 2, Duration::from_secs(1));
        clock.advance(Duration::from_secs(5));

        // Nothing sweeps in the background
        assert_eq!(cache.len(), 2);

        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_overwrites_and_refreshes_expiry() {
        let (clock, cache) = manual_cache();
        cache.set("k", 1, Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));
        cache.set("k", 2, Duration::from_secs(10));
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get("k"), Some(2));
    }
}
