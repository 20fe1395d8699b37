//! Word caching repository: key derivation + variant codec + bounded cache.
//!
//! Keys are 32-bit hashes, so two queries can share a key. The repository
//! does not detect this: a store for one query overwrites the other, and a
//! load returns whatever was stored last under that key.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::cache::{BoundedCache, CacheConfig, MokaBoundedCache};
use crate::codec;
use crate::error::{Result, WordCacheError};
use crate::key::{KeyDeriver, LookupKey};
use crate::stats::StatsSnapshot;
use crate::variant::VariantMap;

/// Memoization surface for transcription lookups.
pub trait WordCache: Send + Sync {
    fn hash_word(&self, is_reverse: bool, lang: &str, word: &str) -> LookupKey;

    fn store_word(&self, variants: &VariantMap, key: LookupKey);

    /// `Ok(None)` on miss. A damaged entry is an error, never a miss.
    fn load_word(&self, key: LookupKey) -> Result<Option<VariantMap>>;
}

pub struct WordCachingRepository<C: BoundedCache = MokaBoundedCache> {
    keys: KeyDeriver,
    cache: C,
    decode_failures: AtomicU64,
}

impl WordCachingRepository<MokaBoundedCache> {
    /// Moka-backed repository with an explicit seed.
    pub fn with_config(config: &CacheConfig, seed: u32) -> Result<Self> {
        Ok(Self::new(MokaBoundedCache::new(config)?, KeyDeriver::new(seed)))
    }

    /// Moka-backed repository with a seed drawn from the OS CSPRNG.
    pub fn from_entropy(config: &CacheConfig) -> Result<Self> {
        Ok(Self::new(
            MokaBoundedCache::new(config)?,
            KeyDeriver::from_entropy()?,
        ))
    }
}

impl<C: BoundedCache> WordCachingRepository<C> {
    pub fn new(cache: C, keys: KeyDeriver) -> Self {
        Self {
            keys,
            cache,
            decode_failures: AtomicU64::new(0),
        }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn key_deriver(&self) -> &KeyDeriver {
        &self.keys
    }

    /// Backend statistics plus the repository's decode failure count.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            ..self.cache.stats()
        }
    }
}

impl<C: BoundedCache> WordCache for WordCachingRepository<C> {
    fn hash_word(&self, is_reverse: bool, lang: &str, word: &str) -> LookupKey {
        self.keys.derive_key(is_reverse, lang, word)
    }

    fn store_word(&self, variants: &VariantMap, key: LookupKey) {
        let encoded = codec::encode(variants);
        debug!(
            key,
            variants = variants.variant_count(),
            bytes = encoded.len(),
            "word stored"
        );
        self.cache.set(key, encoded);
    }

    fn load_word(&self, key: LookupKey) -> Result<Option<VariantMap>> {
        let Some(encoded) = self.cache.get(key) else {
            debug!(key, "word cache miss");
            return Ok(None);
        };
        if encoded.is_empty() {
            debug!(key, "empty cache value treated as miss");
            return Ok(None);
        }

        match codec::decode(&encoded) {
            Ok(Some(variants)) => {
                debug!(key, variants = variants.variant_count(), "word cache hit");
                Ok(Some(variants))
            }
            Ok(None) => {
                debug!(key, "entry carries no variants, treated as miss");
                Ok(None)
            }
            Err(source) => {
                self.decode_failures.fetch_add(1, Ordering::Relaxed);
                warn!(key, error = %source, bytes = encoded.len(), "corrupt word cache entry");
                Err(WordCacheError::CorruptEntry { key, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LruBoundedCache;

    fn repo() -> WordCachingRepository {
        WordCachingRepository::with_config(&CacheConfig::default(), 0x5eed).unwrap()
    }

    #[test]
    fn kat_round_trip() {
        let repo = repo();
        let key = repo.hash_word(false, "nl", "kat");
        let map = VariantMap::new("kat").with_variant(1, "kot");
        repo.store_word(&map, key);
        assert_eq!(repo.load_word(key).unwrap(), Some(map));
    }

    #[test]
    fn unknown_key_is_miss() {
        let repo = repo();
        assert_eq!(repo.load_word(12345).unwrap(), None);
        assert_eq!(repo.stats().misses, 1);
    }

    #[test]
    fn empty_value_is_miss() {
        let repo = repo();
        repo.cache().set(7, Vec::new());
        assert_eq!(repo.load_word(7).unwrap(), None);
    }

    #[test]
    fn source_only_map_loads_as_miss() {
        let repo = repo();
        let key = repo.hash_word(true, "en", "a");
        repo.store_word(&VariantMap::new("a"), key);
        assert_eq!(repo.load_word(key).unwrap(), None);
    }

    #[test]
    fn corrupt_entry_is_an_error_not_a_miss() {
        let repo = repo();
        let mut buf = 1u32.to_le_bytes().to_vec();
        buf.extend_from_slice(&[0u8; 8]);
        repo.cache().set(99, buf);
        let err = repo.load_word(99).unwrap_err();
        assert!(matches!(err, WordCacheError::CorruptEntry { key: 99, .. }));
        assert_eq!(repo.stats().decode_failures, 1);
        assert_eq!(repo.stats().misses, 0);
    }

    #[test]
    fn hash_word_uses_the_deriver() {
        let repo = repo();
        let direct = KeyDeriver::new(0x5eed).derive_key(true, "nl", "kat");
        assert_eq!(repo.hash_word(true, "nl", "kat"), direct);
    }

    #[test]
    fn works_over_lru_backend() {
        let cache = LruBoundedCache::new(&CacheConfig::default()).unwrap();
        let repo = WordCachingRepository::new(cache, KeyDeriver::new(3));
        let key = repo.hash_word(false, "de", "Katze");
        let map = VariantMap::new("Katze").with_variant(2, "katse");
        repo.store_word(&map, key);
        assert_eq!(repo.load_word(key).unwrap(), Some(map));
    }

    #[test]
    fn usable_as_trait_object() {
        let repo: Box<dyn WordCache> = Box::new(repo());
        let key = repo.hash_word(false, "fr", "chat");
        repo.store_word(&VariantMap::new("chat").with_variant(1, "ʃa"), key);
        assert!(repo.load_word(key).unwrap().is_some());
    }
}
