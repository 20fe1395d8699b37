//! Lookup key derivation.
//! Key: murmur3 x86_32 of `word | NUL | lang [| "_reverse"]`, seeded per deriver.
//!
//! Keys live in a 32-bit space and are NOT collision free. Two distinct queries
//! can map to the same key, in which case the later store overwrites the earlier
//! one and a load for either query returns whatever was stored last. Callers
//! accept this in exchange for a small fixed-size key.

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::debug;

use crate::error::Result;

/// 32-bit cache key. Only meaningful together with the seed that produced it.
pub type LookupKey = u32;

const REVERSE_SUFFIX: &[u8] = b"_reverse";

/// Derives lookup keys from (direction, language, word) queries.
#[derive(Debug, Clone, Copy)]
pub struct KeyDeriver {
    seed: u32,
}

impl KeyDeriver {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Draw the seed from the OS CSPRNG. Keys will differ from any other process.
    pub fn from_entropy() -> Result<Self> {
        let mut buf = [0u8; 4];
        OsRng.try_fill_bytes(&mut buf)?;
        let seed = u32::from_le_bytes(buf);
        debug!("key deriver seeded from OS entropy");
        Ok(Self { seed })
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Hash input for a query: word, NUL, language, then `_reverse` for the reverse direction.
    pub fn canonical_bytes(is_reverse: bool, lang: &str, word: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(word.len() + 1 + lang.len() + REVERSE_SUFFIX.len());
        buf.extend_from_slice(word.as_bytes());
        buf.push(0);
        buf.extend_from_slice(lang.as_bytes());
        if is_reverse {
            buf.extend_from_slice(REVERSE_SUFFIX);
        }
        buf
    }

    pub fn derive_key(&self, is_reverse: bool, lang: &str, word: &str) -> LookupKey {
        let canonical = Self::canonical_bytes(is_reverse, lang, word);
        // Reading from an in-memory slice cannot fail.
        murmur3::murmur3_32(&mut canonical.as_slice(), self.seed).unwrap_or_default()
    }
}
