//! Single-slot rate cache with TTL.

use chrono::{Duration, Utc};
use fxconvert_common::cache_duration;
use parking_lot::Mutex;
use tracing::debug;

use crate::snapshot::RateSnapshot;

/// Configuration for the rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// How long a snapshot may be reused.
    pub ttl: Duration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            ttl: cache_duration(),
        }
    }
}

/// Holds at most one snapshot, for the most recently fetched base currency.
///
/// Storing a snapshot for a different base evicts the previous one.
pub struct RateCache {
    slot: Mutex<Option<RateSnapshot>>,
    config: RateCacheConfig,
}

impl RateCache {
    /// Create an empty cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(RateCacheConfig::default())
    }

    /// Create an empty cache with custom configuration.
    pub fn with_config(config: RateCacheConfig) -> Self {
        Self {
            slot: Mutex::new(None),
            config,
        }
    }

    /// Get the cached snapshot if it is for `base` and still fresh.
    pub fn get(&self, base: &str) -> Option<RateSnapshot> {
        let slot = self.slot.lock();
        match slot.as_ref() {
            Some(snapshot) if snapshot.is_fresh_for(base, self.config.ttl, Utc::now()) => {
                debug!(base = %base, "Cache hit");
                Some(snapshot.clone())
            }
            Some(snapshot) => {
                debug!(
                    base = %base,
                    cached_base = %snapshot.base_currency,
                    "Cache entry stale or for another base"
                );
                None
            }
            None => {
                debug!(base = %base, "Cache miss");
                None
            }
        }
    }

    /// Replace the slot with `snapshot`.
    pub fn store(&self, snapshot: RateSnapshot) {
        *self.slot.lock() = Some(snapshot);
    }

    /// Empty the slot.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Check if the slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Base currency of the held snapshot, fresh or not.
    pub fn cached_base(&self) -> Option<String> {
        self.slot.lock().as_ref().map(|s| s.base_currency.clone())
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    fn make_snapshot(base: &str) -> RateSnapshot {
        RateSnapshot::new(base, HashMap::from([("EUR".to_string(), 0.92)]))
    }

    #[test]
    fn test_cache_store_and_get() {
        let cache = RateCache::new();
        cache.store(make_snapshot("USD"));

        let cached = cache.get("USD").unwrap();
        assert_eq!(cached.base_currency, "USD");
        assert_eq!(cached.rate("EUR"), Some(0.92));
    }

    #[test]
    fn test_cache_miss() {
        let cache = RateCache::new();
        assert!(cache.is_empty());
        assert!(cache.get("USD").is_none());
    }

    #[test]
    fn test_cache_other_base() {
        let cache = RateCache::new();
        cache.store(make_snapshot("USD"));

        assert!(cache.get("GBP").is_none());
        // Lookup for another base does not evict.
        assert_eq!(cache.cached_base().as_deref(), Some("USD"));
    }

    #[test]
    fn test_cache_single_slot() {
        let cache = RateCache::new();
        cache.store(make_snapshot("USD"));
        cache.store(make_snapshot("GBP"));

        assert!(cache.get("USD").is_none());
        assert!(cache.get("GBP").is_some());
    }

    #[test]
    fn test_cache_expiry() {
        let cache = RateCache::with_config(RateCacheConfig {
            ttl: Duration::milliseconds(50),
        });
        cache.store(make_snapshot("USD"));

        assert!(cache.get("USD").is_some());

        sleep(StdDuration::from_millis(60));

        assert!(cache.get("USD").is_none());
    }

    #[test]
    fn test_cache_clear() {
        let cache = RateCache::new();
        cache.store(make_snapshot("USD"));
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get("USD").is_none());
    }

    #[test]
    fn test_default_ttl_is_one_hour() {
        assert_eq!(RateCache::new().config.ttl, Duration::hours(1));
    }
}
