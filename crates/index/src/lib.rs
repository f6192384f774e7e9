//! Query resolution engine for Pharos.
//!
//! Given a set of multihashes, the engine discovers all relevant location
//! commitments, equivalence claims, and shard indexes by walking a claim
//! graph across three read-through data sources:
//! - a provider index fronting the network content-routing index
//! - a claim store fronting HTTP claim origins
//! - a shard-index store fronting HTTP blob origins
//!
//! Traversal is concurrent, deduplicated, and bounded by the finite set of
//! reachable (multihash, intent) pairs.

pub mod blobindex;
pub mod claims;
pub mod error;
pub mod fetch;
pub mod provider;
pub mod routing;
pub mod service;
pub mod walker;

pub use blobindex::{CachingShardIndexLookup, ShardIndexLookup};
pub use claims::{CachingClaimLookup, ClaimLookup};
pub use error::IndexError;
pub use fetch::{Fetcher, HttpFetcher, StandardUrlBuilder, UrlBuilder};
pub use provider::{CachingProviderIndex, ProviderIndex, QueryKey};
pub use routing::{Advertiser, HttpRoutingClient, LegacySource, NoopAdvertiser, RoutingClient};
pub use service::{IndexingService, QueryError};
