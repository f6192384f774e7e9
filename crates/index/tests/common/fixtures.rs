#![allow(dead_code)]

use bytes::Bytes;
use cid::Cid;
use pharos_core::{
    encode_metadata, sha256_multihash, Capability, ClaimBlock, Delegation, Did, EncodedContextId,
    Multihash, PeerId, ProviderInfo, ProviderRecord, RAW_CODEC,
};
use pharos_index::{StandardUrlBuilder, UrlBuilder};

pub fn mh(seed: &str) -> Multihash {
    sha256_multihash(seed.as_bytes())
}

pub fn raw_cid(seed: &str) -> Cid {
    Cid::new_v1(RAW_CODEC, mh(seed))
}

pub fn ctx(seed: &str) -> EncodedContextId {
    EncodedContextId::from_multihash(&mh(seed))
}

pub fn provider(port: u16) -> ProviderInfo {
    ProviderInfo {
        peer: PeerId::from_bytes(mh(&format!("peer-{port}")).to_bytes()),
        addrs: vec![format!("/ip4/127.0.0.1/tcp/{port}/http").parse().unwrap()],
    }
}

pub fn record(
    provider: &ProviderInfo,
    context_id: EncodedContextId,
    blocks: &[ClaimBlock],
) -> ProviderRecord {
    ProviderRecord {
        provider: provider.clone(),
        context_id,
        metadata: Bytes::from(encode_metadata(blocks).unwrap()),
    }
}

/// A parseable delegation distinguishable by its resource label.
pub fn delegation(label: &str) -> Delegation {
    Delegation {
        issuer: Did::new("did:key:z6MkIssuer").unwrap(),
        audience: Did::new("did:web:indexer.example.com").unwrap(),
        capabilities: vec![Capability {
            can: "assert/location".to_string(),
            with: format!("did:key:z{label}"),
            nb: None,
        }],
        expiration: None,
        signature: Bytes::from_static(b"sig"),
    }
}

pub fn delegation_bytes(label: &str) -> Bytes {
    Bytes::from(delegation(label).to_bytes().unwrap())
}

/// The URL the engine will derive for a claim fetch.
pub fn claim_url(provider: &ProviderInfo, claim: &Cid) -> String {
    StandardUrlBuilder
        .claim_url(provider, claim)
        .unwrap()
        .to_string()
}

/// The URL the engine will derive for a blob fetch.
pub fn blob_url(provider: &ProviderInfo, shard: &Cid) -> String {
    StandardUrlBuilder
        .retrieval_url(provider, shard)
        .unwrap()
        .to_string()
}
