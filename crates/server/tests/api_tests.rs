//! End-to-end API tests over a service wired with stub collaborators.

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use pharos_cache::{claim_store, provider_store, shard_index_store, MemoryClient};
use pharos_core::config::AppConfig;
use pharos_core::{
    encode_metadata, sha256_multihash, Capability, ClaimBlock, Delegation, Did, EncodedContextId,
    LocationCommitment, Multihash, PeerId, ProviderInfo, ProviderRecord, RAW_CODEC,
};
use pharos_index::{
    CachingClaimLookup, CachingProviderIndex, CachingShardIndexLookup, Fetcher, IndexError,
    IndexingService, NoopAdvertiser, RoutingClient, StandardUrlBuilder, UrlBuilder,
};
use pharos_server::{create_router, AppState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct StubRouting {
    records: HashMap<Vec<u8>, Vec<ProviderRecord>>,
}

#[async_trait]
impl RoutingClient for StubRouting {
    async fn find(&self, hash: &Multihash) -> Result<Vec<ProviderRecord>, IndexError> {
        Ok(self
            .records
            .get(&hash.to_bytes())
            .cloned()
            .unwrap_or_default())
    }
}

struct StubFetcher {
    bodies: HashMap<String, Bytes>,
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(
        &self,
        url: &reqwest::Url,
        _range: Option<&pharos_core::ByteRange>,
    ) -> Result<Bytes, IndexError> {
        self.bodies
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| IndexError::NotFound(url.to_string()))
    }
}

fn service_over(routing: StubRouting, fetcher: StubFetcher) -> IndexingService {
    let ttl = Duration::from_secs(60);
    let provider_index = Arc::new(CachingProviderIndex::new(
        provider_store(Arc::new(MemoryClient::new(ttl))),
        Arc::new(routing),
        Arc::new(NoopAdvertiser),
    ));
    let fetcher: Arc<dyn Fetcher> = Arc::new(fetcher);
    let claim_lookup = Arc::new(CachingClaimLookup::new(
        claim_store(Arc::new(MemoryClient::new(ttl))),
        fetcher.clone(),
    ));
    let shard_index_lookup = Arc::new(CachingShardIndexLookup::new(
        shard_index_store(Arc::new(MemoryClient::new(ttl))),
        fetcher,
        provider_index.clone(),
    ));
    IndexingService::new(
        provider_index,
        claim_lookup,
        shard_index_lookup,
        Arc::new(StandardUrlBuilder),
    )
}

fn router_over(service: IndexingService) -> Router {
    let state = AppState::new(AppConfig::for_testing(), Arc::new(service));
    create_router(state)
}

async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn multibase_hash(hash: &Multihash) -> String {
    cid::multibase::encode(cid::multibase::Base::Base58Btc, hash.to_bytes())
}

fn empty_service() -> IndexingService {
    service_over(
        StubRouting {
            records: HashMap::new(),
        },
        StubFetcher {
            bodies: HashMap::new(),
        },
    )
}

#[tokio::test]
async fn health_check_responds_ok() {
    let base = spawn_server(router_over(empty_service())).await;

    let response = reqwest::get(format!("{base}/v1/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn query_with_invalid_hash_is_bad_request() {
    let base = spawn_server(router_over(empty_service())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1/claims/query"))
        .json(&serde_json::json!({ "hashes": ["!!not-multibase!!"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn query_with_no_hashes_is_bad_request() {
    let base = spawn_server(router_over(empty_service())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1/claims/query"))
        .json(&serde_json::json!({ "hashes": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn query_resolves_claims_end_to_end() {
    let hash = sha256_multihash(b"content");
    let claim_cid = cid::Cid::new_v1(RAW_CODEC, sha256_multihash(b"claim"));
    let provider = ProviderInfo {
        peer: PeerId::from_bytes(sha256_multihash(b"peer").to_bytes()),
        addrs: vec!["/ip4/127.0.0.1/tcp/8080/http".parse().unwrap()],
    };
    let claim = Delegation {
        issuer: Did::new("did:key:z6MkIssuer").unwrap(),
        audience: Did::new("did:web:indexer.example.com").unwrap(),
        capabilities: vec![Capability {
            can: "assert/location".to_string(),
            with: "did:key:z6MkSpace".to_string(),
            nb: None,
        }],
        expiration: None,
        signature: Bytes::from_static(b"sig"),
    };

    let metadata = encode_metadata(&[ClaimBlock::Location(LocationCommitment {
        claim: claim_cid,
        shard: None,
        range: None,
    })])
    .unwrap();
    let record = ProviderRecord {
        provider: provider.clone(),
        context_id: EncodedContextId::from_multihash(&sha256_multihash(b"ctx")),
        metadata: Bytes::from(metadata),
    };

    let claim_url = StandardUrlBuilder
        .claim_url(&provider, &claim_cid)
        .unwrap()
        .to_string();

    let base = spawn_server(router_over(service_over(
        StubRouting {
            records: HashMap::from([(hash.to_bytes(), vec![record])]),
        },
        StubFetcher {
            bodies: HashMap::from([(claim_url, Bytes::from(claim.to_bytes().unwrap()))]),
        },
    )))
    .await;

    let response = reqwest::Client::new()
        .post(format!("{base}/v1/claims/query"))
        .json(&serde_json::json!({ "hashes": [multibase_hash(&hash)] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    let claims = body["claims"].as_object().unwrap();
    assert_eq!(claims.len(), 1);
    assert!(claims.contains_key(&claim_cid.to_string()));
    assert!(body["indexes"].as_object().unwrap().is_empty());
}
