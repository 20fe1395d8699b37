//! wordcache: bounded in-memory memoization of word transcription variants.
//! Queries hash to 32-bit keys, variant maps pack into a compact byte layout,
//! and entries live in a cost-bounded TTL cache.

pub mod cache;
pub mod codec;
pub mod error;
pub mod key;
pub mod repository;
pub mod stats;
pub mod variant;

pub use cache::{
    BoundedCache, CacheConfig, CostStrategy, EncodedEntry, LruBoundedCache, MokaBoundedCache,
};
pub use error::{CodecError, Result, WordCacheError};
pub use key::{KeyDeriver, LookupKey};
pub use repository::{WordCache, WordCachingRepository};
pub use stats::{CacheStats, StatsSnapshot};
pub use variant::{VariantMap, SOURCE_ID};

/// Install a global `tracing` fmt subscriber.
/// `RUST_LOG` overrides `default_directive` (e.g. `"wordcache=debug"`).
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| WordCacheError::Tracing(e.to_string()))?;
    tracing::info!("wordcache tracing initialized");
    Ok(())
}
