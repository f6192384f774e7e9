//! External collaborators of the provider index.
//!
//! The network content-routing protocol client, the advertisement publisher,
//! and the legacy record source are consumed behind traits; the engine only
//! depends on their contracts. A minimal HTTP routing client is provided for
//! wiring the service binary.

use crate::error::IndexError;
use async_trait::async_trait;
use cid::multibase::{encode, Base};
use pharos_core::{decode_records, Multihash, ProviderRecord};
use reqwest::{StatusCode, Url};
use std::time::Duration;

/// Client for the network content-routing index.
#[async_trait]
pub trait RoutingClient: Send + Sync {
    /// All provider records the network knows for `hash`.
    async fn find(&self, hash: &Multihash) -> Result<Vec<ProviderRecord>, IndexError>;
}

/// Publishes advertisements for newly cached provider records.
#[async_trait]
pub trait Advertiser: Send + Sync {
    async fn announce(
        &self,
        hashes: &[Multihash],
        record: &ProviderRecord,
    ) -> Result<(), IndexError>;
}

/// Advertiser that records nothing. Used when advertisement publishing is
/// handled out-of-band by the storage providers themselves.
pub struct NoopAdvertiser;

#[async_trait]
impl Advertiser for NoopAdvertiser {
    async fn announce(
        &self,
        hashes: &[Multihash],
        record: &ProviderRecord,
    ) -> Result<(), IndexError> {
        tracing::debug!(
            hashes = hashes.len(),
            provider = %record.provider.peer,
            "skipping advertisement"
        );
        Ok(())
    }
}

/// Synthesises provider records from pre-routing-index systems when both the
/// cache and the network index come up empty.
#[async_trait]
pub trait LegacySource: Send + Sync {
    async fn find(&self, hash: &Multihash) -> Result<Vec<ProviderRecord>, IndexError>;
}

/// HTTP routing-index client: `GET {base}/multihash/{base58btc}` returning a
/// CBOR list of provider records.
pub struct HttpRoutingClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpRoutingClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, IndexError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Internal(e.to_string()))?;
        Ok(Self { http, base })
    }
}

#[async_trait]
impl RoutingClient for HttpRoutingClient {
    async fn find(&self, hash: &Multihash) -> Result<Vec<ProviderRecord>, IndexError> {
        let url = self
            .base
            .join(&format!(
                "multihash/{}",
                encode(Base::Base58Btc, hash.to_bytes())
            ))
            .map_err(|e| IndexError::Internal(e.to_string()))?;

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| IndexError::Routing(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| IndexError::Routing(e.to_string()))?;
                decode_records(&body).map_err(IndexError::from)
            }
            status => Err(IndexError::Routing(format!(
                "unexpected status {status} from {url}"
            ))),
        }
    }
}
