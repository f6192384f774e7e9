//! Key/value client trait.

use crate::error::CacheResult;
use async_trait::async_trait;
use bytes::Bytes;

/// An expirable key/value transport.
///
/// Entries written with `expires = true` live for the backend's configured
/// TTL; entries written with `expires = false` persist until overwritten.
/// `set_expirable` flips an existing entry between the two without rewriting
/// its value.
#[async_trait]
pub trait KvClient: Send + Sync + 'static {
    /// Get a value. `None` means absent or expired.
    async fn get(&self, key: &[u8]) -> CacheResult<Option<Bytes>>;

    /// Set a value, expirable or persistent.
    async fn set(&self, key: &[u8], value: Bytes, expires: bool) -> CacheResult<()>;

    /// Flip an existing entry's expiration without touching its value.
    async fn set_expirable(&self, key: &[u8], expirable: bool) -> CacheResult<()>;
}
