//! Bounded key → encoded-entry stores.
//! Capacity is a total cost budget. TTL counts from insertion. Both backends are
//! internally synchronized and keep their own statistics.

pub mod lru_cache;
pub mod moka_cache;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WordCacheError};
use crate::key::LookupKey;
use crate::stats::StatsSnapshot;

pub use lru_cache::LruBoundedCache;
pub use moka_cache::MokaBoundedCache;

/// Opaque encoded variant map, as stored in the cache.
pub type EncodedEntry = Vec<u8>;

/// Default capacity: 10 000 entries at the default cost of 1.
pub const DEFAULT_CAPACITY: u64 = 10_000;
/// Default TTL: 1 hour from insertion.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Capability the repository needs from its store.
pub trait BoundedCache: Send + Sync {
    /// Returns None if absent, expired or evicted.
    fn get(&self, key: LookupKey) -> Option<EncodedEntry>;

    /// Insert or overwrite. May evict other entries.
    fn set(&self, key: LookupKey, value: EncodedEntry);

    fn entry_count(&self) -> u64;

    fn stats(&self) -> StatsSnapshot;

    /// Apply any deferred eviction/expiry work now.
    fn run_pending_tasks(&self) {}
}

/// A shared cache is still a cache.
impl<T: BoundedCache + ?Sized> BoundedCache for Arc<T> {
    fn get(&self, key: LookupKey) -> Option<EncodedEntry> {
        (**self).get(key)
    }

    fn set(&self, key: LookupKey, value: EncodedEntry) {
        (**self).set(key, value)
    }

    fn entry_count(&self) -> u64 {
        (**self).entry_count()
    }

    fn stats(&self) -> StatsSnapshot {
        (**self).stats()
    }

    fn run_pending_tasks(&self) {
        (**self).run_pending_tasks()
    }
}

/// Per-entry eviction cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStrategy {
    /// Every entry costs the same: capacity becomes an entry count.
    Constant(u32),
    /// Cost equals the encoded size in bytes: capacity becomes a byte budget.
    EncodedLength,
}

impl CostStrategy {
    pub fn cost(&self, value: &[u8]) -> u32 {
        match *self {
            CostStrategy::Constant(cost) => cost,
            CostStrategy::EncodedLength => u32::try_from(value.len()).unwrap_or(u32::MAX),
        }
    }
}

impl Default for CostStrategy {
    fn default() -> Self {
        CostStrategy::Constant(1)
    }
}

/// Construction-time cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total cost budget.
    pub capacity: u64,
    pub ttl: Duration,
    pub cost: CostStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
            cost: CostStrategy::default(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(WordCacheError::InvalidConfig("capacity must be > 0".into()));
        }
        if self.ttl.is_zero() {
            return Err(WordCacheError::InvalidConfig("ttl must be > 0".into()));
        }
        if self.cost == CostStrategy::Constant(0) {
            return Err(WordCacheError::InvalidConfig(
                "constant cost must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 10_000);
        assert_eq!(config.ttl, Duration::from_secs(3600));
        assert_eq!(config.cost, CostStrategy::Constant(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_config() {
        let zero_cap = CacheConfig {
            capacity: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(
            zero_cap.validate(),
            Err(WordCacheError::InvalidConfig(_))
        ));

        let zero_ttl = CacheConfig {
            ttl: Duration::ZERO,
            ..CacheConfig::default()
        };
        assert!(zero_ttl.validate().is_err());

        let free = CacheConfig {
            cost: CostStrategy::Constant(0),
            ..CacheConfig::default()
        };
        assert!(free.validate().is_err());
    }

    #[test]
    fn shared_cache_is_visible_through_every_handle() {
        let cache = Arc::new(MokaBoundedCache::new(&CacheConfig::default()).unwrap());
        let shared: Arc<dyn BoundedCache> = cache.clone();
        shared.set(4, b"four".to_vec());
        assert_eq!(cache.get(4), Some(b"four".to_vec()));
        assert_eq!(shared.stats().inserts, 1);
        assert_eq!(shared.entry_count(), cache.entry_count());
    }

    #[test]
    fn cost_strategies() {
        assert_eq!(CostStrategy::Constant(1).cost(b"anything"), 1);
        assert_eq!(CostStrategy::EncodedLength.cost(b"abcd"), 4);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"capacity": 64, "cost": "encoded_length"}"#).unwrap();
        assert_eq!(config.capacity, 64);
        assert_eq!(config.cost, CostStrategy::EncodedLength);
        assert_eq!(config.ttl, DEFAULT_TTL);

        let constant: CacheConfig =
            serde_json::from_str(r#"{"cost": {"constant": 2}}"#).unwrap();
        assert_eq!(constant.cost, CostStrategy::Constant(2));
    }
}
