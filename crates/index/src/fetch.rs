//! HTTP fetchers and retrieval URL derivation.

use crate::error::IndexError;
use async_trait::async_trait;
use bytes::Bytes;
use cid::Cid;
use multiaddr::Protocol;
use pharos_core::{ByteRange, ProviderInfo};
use reqwest::{header, StatusCode, Url};
use std::time::Duration;

/// Fetches bytes from an origin, optionally constrained to a byte range.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, range: Option<&ByteRange>) -> Result<Bytes, IndexError>;
}

/// reqwest-backed fetcher honouring the byte-range hint via a `Range` header.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, IndexError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Internal(e.to_string()))?;
        Ok(Self { http })
    }
}

pub(crate) fn range_header(range: &ByteRange) -> String {
    match range.length {
        Some(length) if length > 0 => {
            format!("bytes={}-{}", range.offset, range.offset + length - 1)
        }
        _ => format!("bytes={}-", range.offset),
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, range: Option<&ByteRange>) -> Result<Bytes, IndexError> {
        let mut request = self.http.get(url.clone());
        if let Some(range) = range {
            request = request.header(header::RANGE, range_header(range));
        }

        let response = request.send().await.map_err(|e| IndexError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IndexError::NotFound(url.to_string())),
            status if status.is_success() => {
                response.bytes().await.map_err(|e| IndexError::Fetch {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            status => Err(IndexError::Fetch {
                url: url.to_string(),
                reason: format!("unexpected status {status}"),
            }),
        }
    }
}

/// Derives claim and retrieval URLs from a provider's announced addresses.
pub trait UrlBuilder: Send + Sync {
    fn claim_url(&self, provider: &ProviderInfo, claim: &Cid) -> Result<Url, IndexError>;
    fn retrieval_url(&self, provider: &ProviderInfo, shard: &Cid) -> Result<Url, IndexError>;
}

/// Deterministic derivation from the provider's first HTTP-capable multiaddr:
/// claims at `…/claims/{cid}`, blobs at `…/blobs/{cid}`.
pub struct StandardUrlBuilder;

impl StandardUrlBuilder {
    fn base_url(provider: &ProviderInfo) -> Option<Url> {
        for addr in &provider.addrs {
            let mut host: Option<String> = None;
            let mut port: Option<u16> = None;
            let mut scheme: Option<&str> = None;
            for protocol in addr.iter() {
                match protocol {
                    Protocol::Dns4(h) | Protocol::Dns6(h) | Protocol::Dnsaddr(h) => {
                        host = Some(h.to_string());
                    }
                    Protocol::Ip4(ip) => host = Some(ip.to_string()),
                    Protocol::Ip6(ip) => host = Some(format!("[{ip}]")),
                    Protocol::Tcp(p) => port = Some(p),
                    Protocol::Http => scheme = scheme.or(Some("http")),
                    Protocol::Https | Protocol::Tls => scheme = Some("https"),
                    _ => {}
                }
            }
            if let (Some(host), Some(port), Some(scheme)) = (host, port, scheme) {
                if let Ok(url) = Url::parse(&format!("{scheme}://{host}:{port}/")) {
                    return Some(url);
                }
            }
        }
        None
    }

    fn join(provider: &ProviderInfo, path: &str) -> Result<Url, IndexError> {
        let base = Self::base_url(provider)
            .ok_or_else(|| IndexError::NoRetrievalUrl(provider.peer.to_string()))?;
        base.join(path).map_err(|e| IndexError::Internal(e.to_string()))
    }
}

impl UrlBuilder for StandardUrlBuilder {
    fn claim_url(&self, provider: &ProviderInfo, claim: &Cid) -> Result<Url, IndexError> {
        Self::join(provider, &format!("claims/{claim}"))
    }

    fn retrieval_url(&self, provider: &ProviderInfo, shard: &Cid) -> Result<Url, IndexError> {
        Self::join(provider, &format!("blobs/{shard}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharos_core::{sha256_multihash, PeerId, RAW_CODEC};

    fn provider(addrs: &[&str]) -> ProviderInfo {
        ProviderInfo {
            peer: PeerId::from_bytes(sha256_multihash(b"peer").to_bytes()),
            addrs: addrs.iter().map(|a| a.parse().unwrap()).collect(),
        }
    }

    #[test]
    fn derives_http_url_from_ip4_addr() {
        let provider = provider(&["/ip4/203.0.113.7/tcp/8080/http"]);
        let claim = Cid::new_v1(RAW_CODEC, sha256_multihash(b"claim"));

        let url = StandardUrlBuilder.claim_url(&provider, &claim).unwrap();
        assert_eq!(
            url.to_string(),
            format!("http://203.0.113.7:8080/claims/{claim}")
        );
    }

    #[test]
    fn prefers_first_http_capable_addr() {
        let provider = provider(&[
            "/ip4/203.0.113.7/udp/4001",
            "/dns4/claims.example.com/tcp/443/https",
        ]);
        let shard = Cid::new_v1(RAW_CODEC, sha256_multihash(b"shard"));

        let url = StandardUrlBuilder.retrieval_url(&provider, &shard).unwrap();
        // 443 is the default https port, so the URL normalises it away.
        assert_eq!(
            url.to_string(),
            format!("https://claims.example.com/blobs/{shard}")
        );
    }

    #[test]
    fn no_http_capable_addr_is_an_error() {
        let provider = provider(&["/ip4/203.0.113.7/udp/4001"]);
        let claim = Cid::new_v1(RAW_CODEC, sha256_multihash(b"claim"));

        let err = StandardUrlBuilder.claim_url(&provider, &claim).unwrap_err();
        assert!(matches!(err, IndexError::NoRetrievalUrl(_)));
    }

    #[test]
    fn range_header_forms() {
        assert_eq!(
            range_header(&ByteRange {
                offset: 0,
                length: Some(100)
            }),
            "bytes=0-99"
        );
        assert_eq!(
            range_header(&ByteRange {
                offset: 512,
                length: None
            }),
            "bytes=512-"
        );
    }
}
