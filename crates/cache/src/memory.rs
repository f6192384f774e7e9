//! In-memory key/value backend with TTL semantics.

use crate::client::KvClient;
use crate::error::CacheResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default TTL for expirable entries: 30 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

struct Entry {
    value: Bytes,
    expires_at: Option<Instant>,
}

/// Process-local key/value store. Expired entries are dropped lazily on read.
pub struct MemoryClient {
    ttl: Duration,
    entries: Mutex<HashMap<Vec<u8>, Entry>>,
}

impl MemoryClient {
    /// Create a store whose expirable entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        entries
            .values()
            .filter(|entry| entry.expires_at.map_or(true, |at| at > now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl KvClient for MemoryClient {
    async fn get(&self, key: &[u8]) -> CacheResult<Option<Bytes>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at.is_some_and(|at| at <= Instant::now()) {
                    entries.remove(key);
                    return Ok(None);
                }
                Ok(Some(entry.value.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &[u8], value: Bytes, expires: bool) -> CacheResult<()> {
        let expires_at = expires.then(|| Instant::now() + self.ttl);
        self.entries
            .lock()
            .await
            .insert(key.to_vec(), Entry { value, expires_at });
        Ok(())
    }

    async fn set_expirable(&self, key: &[u8], expirable: bool) -> CacheResult<()> {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.expires_at = expirable.then(|| Instant::now() + self.ttl);
        }
        Ok(())
    }
}
