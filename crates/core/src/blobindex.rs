//! Sharded DAG indexes: which shards hold which multihashes, and where.

use crate::codec::mh_bytes;
use crate::error::Result;
use crate::hash::Multihash;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Byte position of a slice within a shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: u64,
    pub length: u64,
}

/// The slices contained in one shard.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlobIndex {
    slices: HashMap<Multihash, Position>,
}

impl BlobIndex {
    pub fn insert(&mut self, hash: Multihash, position: Position) {
        self.slices.insert(hash, position);
    }

    /// Membership test for a slice multihash.
    pub fn has(&self, hash: &Multihash) -> bool {
        self.slices.contains_key(hash)
    }

    pub fn get(&self, hash: &Multihash) -> Option<Position> {
        self.slices.get(hash).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Multihash, &Position)> {
        self.slices.iter()
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// An index over the shards of one piece of content.
#[derive(Clone, Debug, PartialEq)]
pub struct ShardedDagIndex {
    /// The content the index describes.
    pub content: Multihash,
    shards: HashMap<Multihash, BlobIndex>,
}

impl ShardedDagIndex {
    pub fn new(content: Multihash) -> Self {
        Self {
            content,
            shards: HashMap::new(),
        }
    }

    /// Record that `slice` lives in `shard` at `position`.
    pub fn insert_slice(&mut self, shard: Multihash, slice: Multihash, position: Position) {
        self.shards.entry(shard).or_default().insert(slice, position);
    }

    /// Iterate over `(shard, slices)` pairs.
    pub fn shards(&self) -> impl Iterator<Item = (&Multihash, &BlobIndex)> {
        self.shards.iter()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// All distinct slice multihashes across every shard.
    pub fn slice_hashes(&self) -> Vec<Multihash> {
        let mut seen = HashSet::new();
        let mut hashes = Vec::new();
        for index in self.shards.values() {
            for (hash, _) in index.iter() {
                if seen.insert(*hash) {
                    hashes.push(*hash);
                }
            }
        }
        hashes
    }

    /// Parse from its CBOR archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let repr: IndexRepr = serde_cbor::from_slice(data)?;
        let mut index = ShardedDagIndex::new(repr.content);
        for shard in repr.shards {
            for slice in shard.slices {
                index.insert_slice(
                    shard.shard,
                    slice.hash,
                    Position {
                        offset: slice.offset,
                        length: slice.length,
                    },
                );
            }
        }
        Ok(index)
    }

    /// Serialise to its CBOR archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let repr = IndexRepr {
            content: self.content,
            shards: self
                .shards
                .iter()
                .map(|(shard, slices)| ShardRepr {
                    shard: *shard,
                    slices: slices
                        .iter()
                        .map(|(hash, position)| SliceRepr {
                            hash: *hash,
                            offset: position.offset,
                            length: position.length,
                        })
                        .collect(),
                })
                .collect(),
        };
        Ok(serde_cbor::to_vec(&repr)?)
    }
}

#[derive(Serialize, Deserialize)]
struct IndexRepr {
    #[serde(with = "mh_bytes")]
    content: Multihash,
    shards: Vec<ShardRepr>,
}

#[derive(Serialize, Deserialize)]
struct ShardRepr {
    #[serde(with = "mh_bytes")]
    shard: Multihash,
    slices: Vec<SliceRepr>,
}

#[derive(Serialize, Deserialize)]
struct SliceRepr {
    #[serde(with = "mh_bytes")]
    hash: Multihash,
    offset: u64,
    length: u64,
}
