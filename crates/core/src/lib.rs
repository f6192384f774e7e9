//! Core domain types and shared logic for the Pharos indexing service.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Multihash and context-identifier types
//! - Provider records and their CBOR codec
//! - Content-claim metadata protocol blocks and their wire codec
//! - Delegations (content claims) and sharded DAG indexes
//! - Query input and result types
//! - Configuration

pub mod blobindex;
pub(crate) mod codec;
pub mod config;
pub mod delegation;
pub mod did;
pub mod error;
pub mod hash;
pub mod metadata;
pub mod provider;
pub mod query;

pub use blobindex::{BlobIndex, Position, ShardedDagIndex};
pub use delegation::{Capability, Delegation};
pub use did::Did;
pub use error::{Error, Result};
pub use hash::{sha256_multihash, EncodedContextId, Multihash, RAW_CODEC, SHA2_256_CODE};
pub use metadata::{
    decode_metadata, encode_metadata, ByteRange, ClaimBlock, EqualsClaim, IndexClaim,
    LocationCommitment, CONTENT_CLAIM_PROTOCOLS, EQUALS_CLAIM_ID, INDEX_CLAIM_ID,
    LOCATION_COMMITMENT_ID,
};
pub use provider::{decode_records, encode_records, PeerId, ProviderInfo, ProviderRecord};
pub use query::{Match, Query, QueryResult};
