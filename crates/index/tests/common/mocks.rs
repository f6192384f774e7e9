#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use pharos_cache::{claim_store, provider_store, shard_index_store, MemoryClient};
use pharos_core::{ByteRange, Multihash, ProviderRecord};
use pharos_index::{
    CachingClaimLookup, CachingProviderIndex, CachingShardIndexLookup, Fetcher, IndexError,
    IndexingService, NoopAdvertiser, ProviderIndex, QueryKey, RoutingClient, StandardUrlBuilder,
};
use reqwest::Url;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Routing index stub serving a fixed record set, recording lookups.
#[derive(Default)]
pub struct StubRouting {
    records: HashMap<Vec<u8>, Vec<ProviderRecord>>,
    pub calls: Mutex<Vec<Multihash>>,
}

impl StubRouting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, hash: Multihash, record: ProviderRecord) {
        self.records.entry(hash.to_bytes()).or_default().push(record);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RoutingClient for StubRouting {
    async fn find(&self, hash: &Multihash) -> Result<Vec<ProviderRecord>, IndexError> {
        self.calls.lock().unwrap().push(*hash);
        Ok(self
            .records
            .get(&hash.to_bytes())
            .cloned()
            .unwrap_or_default())
    }
}

/// Origin stub serving fixed bodies by URL, recording fetches.
#[derive(Default)]
pub struct StubFetcher {
    bodies: HashMap<String, Bytes>,
    failing: HashSet<String>,
    pub calls: Mutex<Vec<(String, Option<ByteRange>)>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, url: String, body: Bytes) {
        self.bodies.insert(url, body);
    }

    pub fn fail(&mut self, url: String) {
        self.failing.insert(url);
    }

    /// Number of fetches issued for `url`.
    pub fn fetches_of(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(fetched, _)| fetched == url)
            .count()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &Url, range: Option<&ByteRange>) -> Result<Bytes, IndexError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), range.copied()));
        if self.failing.contains(url.as_str()) {
            return Err(IndexError::Fetch {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }
        self.bodies
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| IndexError::NotFound(url.to_string()))
    }
}

/// Delegating provider index that records every call.
pub struct RecordingProviderIndex {
    inner: Arc<dyn ProviderIndex>,
    pub find_calls: Mutex<Vec<QueryKey>>,
    pub publish_calls: Mutex<Vec<Vec<Multihash>>>,
}

impl RecordingProviderIndex {
    pub fn new(inner: Arc<dyn ProviderIndex>) -> Self {
        Self {
            inner,
            find_calls: Mutex::new(Vec::new()),
            publish_calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProviderIndex for RecordingProviderIndex {
    async fn find(&self, key: QueryKey) -> Result<Vec<ProviderRecord>, IndexError> {
        self.find_calls.lock().unwrap().push(key.clone());
        self.inner.find(key).await
    }

    async fn publish(
        &self,
        hashes: &[Multihash],
        record: ProviderRecord,
    ) -> Result<(), IndexError> {
        self.publish_calls.lock().unwrap().push(hashes.to_vec());
        self.inner.publish(hashes, record).await
    }
}

/// A fully wired service over stub collaborators.
pub struct Harness {
    pub service: IndexingService,
    pub routing: Arc<StubRouting>,
    pub fetcher: Arc<StubFetcher>,
    pub provider_index: Arc<RecordingProviderIndex>,
}

impl Harness {
    /// The `(hash, target_claims)` pairs seen by the provider index.
    pub fn find_calls(&self) -> Vec<(Multihash, Vec<u64>)> {
        self.provider_index
            .find_calls
            .lock()
            .unwrap()
            .iter()
            .map(|key| (key.hash, key.target_claims.clone()))
            .collect()
    }
}

pub fn harness(routing: StubRouting, fetcher: StubFetcher, concurrency: Option<usize>) -> Harness {
    let routing = Arc::new(routing);
    let fetcher = Arc::new(fetcher);

    let caching = Arc::new(CachingProviderIndex::new(
        provider_store(Arc::new(MemoryClient::new(Duration::from_secs(60)))),
        routing.clone(),
        Arc::new(NoopAdvertiser),
    ));
    let provider_index = Arc::new(RecordingProviderIndex::new(caching));

    let claim_lookup = Arc::new(CachingClaimLookup::new(
        claim_store(Arc::new(MemoryClient::new(Duration::from_secs(60)))),
        fetcher.clone(),
    ));
    let shard_index_lookup = Arc::new(CachingShardIndexLookup::new(
        shard_index_store(Arc::new(MemoryClient::new(Duration::from_secs(60)))),
        fetcher.clone(),
        provider_index.clone(),
    ));

    let mut service = IndexingService::new(
        provider_index.clone(),
        claim_lookup,
        shard_index_lookup,
        Arc::new(StandardUrlBuilder),
    );
    if let Some(concurrency) = concurrency {
        service = service.with_concurrency(concurrency);
    }

    Harness {
        service,
        routing,
        fetcher,
        provider_index,
    }
}
