//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("invalid multihash: {0}")]
    InvalidHash(String),

    #[error("invalid multiaddr: {0}")]
    InvalidMultiaddr(String),

    #[error("invalid claim metadata: {0}")]
    Metadata(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_cbor::Error> for Error {
    fn from(err: serde_cbor::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
