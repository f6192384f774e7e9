//! Engine error types.

use pharos_cache::CacheError;
use thiserror::Error;

/// Errors surfaced by the query resolution engine.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("core error: {0}")]
    Core(#[from] pharos_core::Error),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("routing index error: {0}")]
    Routing(String),

    #[error("no retrieval url for provider {0}")]
    NoRetrievalUrl(String),

    #[error("query cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}
