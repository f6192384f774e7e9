//! Read-through provider index.

use crate::error::IndexError;
use crate::routing::{Advertiser, LegacySource, RoutingClient};
use async_trait::async_trait;
use pharos_cache::{CacheError, ProviderStore};
use pharos_core::{
    decode_metadata, Did, EncodedContextId, Multihash, ProviderRecord, CONTENT_CLAIM_PROTOCOLS,
};
use std::sync::Arc;

/// Parameters for a provider lookup.
#[derive(Clone, Debug)]
pub struct QueryKey {
    pub hash: Multihash,
    /// Spaces to scope the lookup to; empty means unscoped.
    pub spaces: Vec<Did>,
    /// Protocol codes the caller will act upon.
    pub target_claims: Vec<u64>,
}

/// Read/write interface to a local cache of providers that falls back to the
/// network routing index.
#[async_trait]
pub trait ProviderIndex: Send + Sync {
    /// Find provider records for a multihash, filtered by claim type and
    /// (optionally) space scope.
    async fn find(&self, key: QueryKey) -> Result<Vec<ProviderRecord>, IndexError>;

    /// Write a record to the cache with no expiration, then hand it to the
    /// advertiser.
    async fn publish(
        &self,
        hashes: &[Multihash],
        record: ProviderRecord,
    ) -> Result<(), IndexError>;
}

/// Cache-fronted provider index.
pub struct CachingProviderIndex {
    cache: ProviderStore,
    routing: Arc<dyn RoutingClient>,
    advertiser: Arc<dyn Advertiser>,
    legacy: Option<Arc<dyn LegacySource>>,
}

impl CachingProviderIndex {
    pub fn new(
        cache: ProviderStore,
        routing: Arc<dyn RoutingClient>,
        advertiser: Arc<dyn Advertiser>,
    ) -> Self {
        Self {
            cache,
            routing,
            advertiser,
            legacy: None,
        }
    }

    /// Consult a legacy record source when both cache and routing index come
    /// up empty.
    pub fn with_legacy(mut self, legacy: Arc<dyn LegacySource>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    async fn find_uncached(&self, hash: &Multihash) -> Result<Vec<ProviderRecord>, IndexError> {
        let fetched = self.routing.find(hash).await?;
        let filtered: Vec<ProviderRecord> = fetched
            .into_iter()
            .filter(|record| record_matches_codes(record, CONTENT_CLAIM_PROTOCOLS))
            .collect();

        if filtered.is_empty() {
            if let Some(legacy) = &self.legacy {
                // Synthesised records are not cached; the routing index stays
                // the source of truth for future lookups.
                return legacy.find(hash).await;
            }
            return Ok(filtered);
        }

        self.cache.set(hash, &filtered, true).await?;
        Ok(filtered)
    }
}

/// True when the record's metadata decodes to at least one block whose
/// protocol code is in `codes`. Undecodable metadata never matches.
fn record_matches_codes(record: &ProviderRecord, codes: &[u64]) -> bool {
    match decode_metadata(&record.metadata) {
        Ok(blocks) => blocks.iter().any(|block| codes.contains(&block.code())),
        Err(err) => {
            tracing::debug!(
                provider = %record.provider.peer,
                error = %err,
                "skipping provider record with undecodable metadata"
            );
            false
        }
    }
}

#[async_trait]
impl ProviderIndex for CachingProviderIndex {
    async fn find(&self, key: QueryKey) -> Result<Vec<ProviderRecord>, IndexError> {
        let mut records = match self.cache.get(&key.hash).await {
            Ok(records) => records,
            Err(CacheError::NotFound) => self.find_uncached(&key.hash).await?,
            Err(err) => return Err(err.into()),
        };

        records.retain(|record| record_matches_codes(record, &key.target_claims));

        if !key.spaces.is_empty() {
            let wanted: Vec<EncodedContextId> = key
                .spaces
                .iter()
                .map(|space| EncodedContextId::for_space(space, &key.hash))
                .collect();
            records.retain(|record| wanted.contains(&record.context_id));
        }

        Ok(records)
    }

    async fn publish(
        &self,
        hashes: &[Multihash],
        record: ProviderRecord,
    ) -> Result<(), IndexError> {
        for hash in hashes {
            let mut records = match self.cache.get(hash).await {
                Ok(records) => records,
                Err(CacheError::NotFound) => Vec::new(),
                Err(err) => return Err(err.into()),
            };
            if !records.contains(&record) {
                records.push(record.clone());
            }
            // No TTL until publishing completes.
            self.cache.set(hash, &records, false).await?;
        }
        self.advertiser.announce(hashes, &record).await
    }
}
