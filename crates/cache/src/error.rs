//! Cache error types.

use thiserror::Error;

/// Cache operation errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The key is not present (or has expired). Read-through callers treat
    /// this as a miss, not a failure.
    #[error("key not found")]
    NotFound,

    #[error("error accessing cache: {0}")]
    Access(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;
