//! Read-through shard-index lookup.

use crate::error::IndexError;
use crate::fetch::Fetcher;
use crate::provider::ProviderIndex;
use async_trait::async_trait;
use pharos_cache::{CacheError, ShardIndexStore};
use pharos_core::{ByteRange, EncodedContextId, ProviderRecord, ShardedDagIndex};
use reqwest::Url;
use std::sync::Arc;

/// Resolves sharded DAG indexes from a claim context.
#[async_trait]
pub trait ShardIndexLookup: Send + Sync {
    /// Probe the cache for `context_id`; on a miss fetch from `fetch_url`
    /// (honouring `range` when present), parse, cache, and return the index.
    async fn find(
        &self,
        context_id: &EncodedContextId,
        provider: &ProviderRecord,
        fetch_url: &Url,
        range: Option<&ByteRange>,
    ) -> Result<ShardedDagIndex, IndexError>;
}

/// Cache-fronted shard-index lookup over an HTTP origin.
///
/// After a fetch, the provider record is posted back to the provider index for
/// every slice multihash the index enumerates, so sibling lookups in the same
/// index skip the routing index. That write is best-effort and detached from
/// the query path.
pub struct CachingShardIndexLookup {
    cache: ShardIndexStore,
    fetcher: Arc<dyn Fetcher>,
    provider_index: Arc<dyn ProviderIndex>,
}

impl CachingShardIndexLookup {
    pub fn new(
        cache: ShardIndexStore,
        fetcher: Arc<dyn Fetcher>,
        provider_index: Arc<dyn ProviderIndex>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            provider_index,
        }
    }
}

#[async_trait]
impl ShardIndexLookup for CachingShardIndexLookup {
    async fn find(
        &self,
        context_id: &EncodedContextId,
        provider: &ProviderRecord,
        fetch_url: &Url,
        range: Option<&ByteRange>,
    ) -> Result<ShardedDagIndex, IndexError> {
        match self.cache.get(context_id).await {
            Ok(index) => return Ok(index),
            Err(CacheError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let body = self.fetcher.fetch(fetch_url, range).await?;
        let index = ShardedDagIndex::from_bytes(&body)?;
        self.cache.set(context_id, &index, true).await?;

        let hashes = index.slice_hashes();
        let provider_index = self.provider_index.clone();
        let record = provider.clone();
        tokio::spawn(async move {
            if let Err(err) = provider_index.publish(&hashes, record).await {
                tracing::warn!(
                    error = %err,
                    hashes = hashes.len(),
                    "failed to prime provider cache from shard index"
                );
            }
        });

        Ok(index)
    }
}
