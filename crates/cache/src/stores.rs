//! Typed store constructors for the indexing data model.

use crate::client::KvClient;
use crate::error::CacheError;
use crate::store::Store;
use cid::Cid;
use pharos_core::{
    decode_records, encode_records, Delegation, EncodedContextId, Multihash, ProviderRecord,
    ShardedDagIndex,
};
use std::sync::Arc;

/// Provider results keyed by multihash.
pub type ProviderStore = Store<Multihash, Vec<ProviderRecord>>;

/// Claims keyed by claim CID.
pub type ClaimStore = Store<Cid, Delegation>;

/// Shard indexes keyed by claim context.
pub type ShardIndexStore = Store<EncodedContextId, ShardedDagIndex>;

/// A provider-result store over the given client.
pub fn provider_store(client: Arc<dyn KvClient>) -> ProviderStore {
    Store::new(
        |data| decode_records(data).map_err(|e| CacheError::Decode(e.to_string())),
        |records| encode_records(records).map_err(|e| CacheError::Encode(e.to_string())),
        |hash| hash.to_bytes(),
        client,
    )
}

/// A claim store over the given client.
pub fn claim_store(client: Arc<dyn KvClient>) -> ClaimStore {
    Store::new(
        |data| Delegation::from_bytes(data).map_err(|e| CacheError::Decode(e.to_string())),
        |claim| claim.to_bytes().map_err(|e| CacheError::Encode(e.to_string())),
        |cid| cid.to_bytes(),
        client,
    )
}

/// A shard-index store over the given client.
pub fn shard_index_store(client: Arc<dyn KvClient>) -> ShardIndexStore {
    Store::new(
        |data| ShardedDagIndex::from_bytes(data).map_err(|e| CacheError::Decode(e.to_string())),
        |index| index.to_bytes().map_err(|e| CacheError::Encode(e.to_string())),
        |context_id| context_id.as_bytes().to_vec(),
        client,
    )
}
