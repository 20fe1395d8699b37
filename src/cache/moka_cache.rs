//! Default backend: moka concurrent cache with cost weigher, TTL and LRU eviction.
//! Expiry and eviction run inside moka's housekeeping, never in the caller.

use std::sync::Arc;

use moka::notification::RemovalCause;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use tracing::{debug, info};

use super::{BoundedCache, CacheConfig, EncodedEntry};
use crate::error::Result;
use crate::key::LookupKey;
use crate::stats::{CacheStats, StatsSnapshot};

pub struct MokaBoundedCache {
    inner: Cache<LookupKey, EncodedEntry>,
    stats: Arc<CacheStats>,
}

impl MokaBoundedCache {
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;

        let stats = Arc::new(CacheStats::new());
        let listener_stats = Arc::clone(&stats);
        let cost = config.cost;

        let inner = Cache::builder()
            .max_capacity(config.capacity)
            .weigher(move |_key: &LookupKey, value: &EncodedEntry| cost.cost(value))
            .time_to_live(config.ttl)
            .eviction_policy(EvictionPolicy::lru())
            .eviction_listener(move |key: Arc<LookupKey>, _value, cause| match cause {
                RemovalCause::Size => {
                    listener_stats.record_eviction();
                    debug!(key = *key, "entry evicted");
                }
                RemovalCause::Expired => {
                    listener_stats.record_expiration();
                    debug!(key = *key, "entry expired");
                }
                _ => {}
            })
            .build();

        info!(
            capacity = config.capacity,
            ttl_secs = config.ttl.as_secs(),
            cost = ?config.cost,
            "moka word cache created"
        );

        Ok(Self { inner, stats })
    }
}

impl BoundedCache for MokaBoundedCache {
    fn get(&self, key: LookupKey) -> Option<EncodedEntry> {
        let value = self.inner.get(&key);
        match value {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        value
    }

    fn set(&self, key: LookupKey, value: EncodedEntry) {
        self.inner.insert(key, value);
        self.stats.record_insert();
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.inner.entry_count())
    }

    fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CostStrategy;
    use std::time::Duration;

    #[test]
    fn set_then_get() {
        let cache = MokaBoundedCache::new(&CacheConfig::default()).unwrap();
        cache.set(1, b"abc".to_vec());
        assert_eq!(cache.get(1), Some(b"abc".to_vec()));
        assert_eq!(cache.get(2), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.inserts, 1);
    }

    #[test]
    fn set_overwrites() {
        let cache = MokaBoundedCache::new(&CacheConfig::default()).unwrap();
        cache.set(9, b"old".to_vec());
        cache.set(9, b"new".to_vec());
        assert_eq!(cache.get(9), Some(b"new".to_vec()));
    }

    #[test]
    fn capacity_is_enforced() {
        let config = CacheConfig {
            capacity: 10,
            ..CacheConfig::default()
        };
        let cache = MokaBoundedCache::new(&config).unwrap();
        for key in 0..20u32 {
            cache.set(key, vec![1]);
        }
        cache.run_pending_tasks();
        assert!(cache.entry_count() <= 10);
        let present = (0..20u32).filter(|&k| cache.get(k).is_some()).count();
        assert!(present <= 10);
        assert!(cache.stats().evictions >= 10);
    }

    #[test]
    fn byte_cost_budget() {
        let config = CacheConfig {
            capacity: 100,
            cost: CostStrategy::EncodedLength,
            ..CacheConfig::default()
        };
        let cache = MokaBoundedCache::new(&config).unwrap();
        for key in 0..5u32 {
            cache.set(key, vec![0u8; 40]);
        }
        cache.run_pending_tasks();
        assert!(cache.entry_count() <= 2);
    }

    #[test]
    fn ttl_expires_entries() {
        let config = CacheConfig {
            ttl: Duration::from_millis(50),
            ..CacheConfig::default()
        };
        let cache = MokaBoundedCache::new(&config).unwrap();
        cache.set(5, b"x".to_vec());
        assert!(cache.get(5).is_some());
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.get(5), None);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = CacheConfig {
            capacity: 0,
            ..CacheConfig::default()
        };
        assert!(MokaBoundedCache::new(&config).is_err());
    }
}
