//! Alternative backend: `lru::LruCache` behind a mutex.
//! Eviction is the LRU crate's own fixed entry bound. Expired entries read as misses.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use tracing::info;

use super::{BoundedCache, CacheConfig, CostStrategy, EncodedEntry};
use crate::error::{Result, WordCacheError};
use crate::key::LookupKey;
use crate::stats::{CacheStats, StatsSnapshot};

struct CacheEntry {
    value: EncodedEntry,
    inserted_at: Instant,
}

pub struct LruBoundedCache {
    inner: Mutex<LruCache<LookupKey, CacheEntry>>,
    ttl: Duration,
    stats: CacheStats,
}

impl LruBoundedCache {
    /// Only constant-cost configs are supported: the entry bound is `capacity / cost`.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let entries = match config.cost {
            CostStrategy::Constant(cost) => config.capacity / u64::from(cost),
            CostStrategy::EncodedLength => {
                return Err(WordCacheError::InvalidConfig(
                    "lru backend needs a constant cost".into(),
                ))
            }
        };
        let entries = usize::try_from(entries)
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or_else(|| {
                WordCacheError::InvalidConfig(format!(
                    "capacity {} holds no entries at {:?}",
                    config.capacity, config.cost
                ))
            })?;

        info!(
            entries = entries.get(),
            ttl_secs = config.ttl.as_secs(),
            "lru word cache created"
        );
        Ok(Self {
            inner: Mutex::new(LruCache::new(entries)),
            ttl: config.ttl,
            stats: CacheStats::new(),
        })
    }
}

impl BoundedCache for LruBoundedCache {
    fn get(&self, key: LookupKey) -> Option<EncodedEntry> {
        let mut cache = self.inner.lock();
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                self.stats.record_hit();
                return Some(entry.value.clone());
            }
            // Expired: remove it
            cache.pop(&key);
            self.stats.record_expiration();
        }
        self.stats.record_miss();
        None
    }

    fn set(&self, key: LookupKey, value: EncodedEntry) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        let displaced = self.inner.lock().push(key, entry);
        if matches!(displaced, Some((old_key, _)) if old_key != key) {
            self.stats.record_eviction();
        }
        self.stats.record_insert();
    }

    fn entry_count(&self) -> u64 {
        self.inner.lock().len() as u64
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.entry_count())
    }
}
