//! Error types for key derivation, entry decoding and cache construction.
//! A cache miss is never an error: it is reported as `Ok(None)`.

use thiserror::Error;

/// Structural problems found while building or decoding a variant map.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("variant map has no source entry (id 0)")]
    MissingSource,

    #[error("entry truncated: {field} needs {needed} bytes at offset {offset}, buffer has {available}")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("variant id {0} does not fit in 32 bits")]
    IdOutOfRange(u64),

    #[error("record {record} uses the reserved source id 0")]
    ReservedId { record: usize },

    #[error("record {record} repeats variant id {id}")]
    DuplicateId { record: usize, id: u32 },

    #[error("record {record} carries a source form different from record 0")]
    SourceMismatch { record: usize },

    #[error("{0} trailing bytes after data block")]
    TrailingBytes(usize),

    #[error("variant {id} is not valid UTF-8")]
    InvalidUtf8 { id: u32 },
}

#[derive(Error, Debug)]
pub enum WordCacheError {
    #[error("corrupt cache entry for key {key:#010x}: {source}")]
    CorruptEntry {
        key: u32,
        #[source]
        source: CodecError,
    },

    #[error("invalid cache config: {0}")]
    InvalidConfig(String),

    #[error("OS entropy source unavailable: {0}")]
    Entropy(#[from] rand::Error),

    #[error("tracing subscriber init failed: {0}")]
    Tracing(String),
}

pub type Result<T> = std::result::Result<T, WordCacheError>;
