//! Read-through claim lookup.

use crate::error::IndexError;
use crate::fetch::Fetcher;
use async_trait::async_trait;
use cid::Cid;
use pharos_cache::{CacheError, ClaimStore};
use pharos_core::Delegation;
use reqwest::Url;
use std::sync::Arc;

/// Resolves full claims from a claim CID.
#[async_trait]
pub trait ClaimLookup: Send + Sync {
    /// Probe the cache for `claim_cid`; on a miss fetch from `fetch_url`,
    /// parse, cache, and return the claim.
    async fn lookup_claim(
        &self,
        claim_cid: &Cid,
        fetch_url: &Url,
    ) -> Result<Delegation, IndexError>;
}

/// Cache-fronted claim lookup over an HTTP origin.
pub struct CachingClaimLookup {
    cache: ClaimStore,
    fetcher: Arc<dyn Fetcher>,
}

impl CachingClaimLookup {
    pub fn new(cache: ClaimStore, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { cache, fetcher }
    }
}

#[async_trait]
impl ClaimLookup for CachingClaimLookup {
    async fn lookup_claim(
        &self,
        claim_cid: &Cid,
        fetch_url: &Url,
    ) -> Result<Delegation, IndexError> {
        match self.cache.get(claim_cid).await {
            Ok(claim) => return Ok(claim),
            Err(CacheError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let body = self.fetcher.fetch(fetch_url, None).await?;
        let claim = Delegation::from_bytes(&body)?;
        // Cache writes on parse success only.
        self.cache.set(claim_cid, &claim, true).await?;
        tracing::debug!(claim = %claim_cid, "claim fetched and cached");
        Ok(claim)
    }
}
