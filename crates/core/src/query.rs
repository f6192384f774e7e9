//! Query input and result types.

use crate::delegation::Delegation;
use crate::did::Did;
use crate::hash::{EncodedContextId, Multihash};
use cid::Cid;
use std::collections::HashMap;

use crate::blobindex::ShardedDagIndex;

/// Narrows a query to claims scoped to particular spaces.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Match {
    pub subjects: Vec<Did>,
}

/// A request for all claims and indexes reachable from a set of multihashes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    pub hashes: Vec<Multihash>,
    pub scope: Match,
}

impl Query {
    /// A query over `hashes` with no space scoping.
    pub fn new(hashes: Vec<Multihash>) -> Self {
        Self {
            hashes,
            scope: Match::default(),
        }
    }

    /// Restrict results to claims scoped to the given spaces.
    pub fn with_subjects(mut self, subjects: Vec<Did>) -> Self {
        self.scope = Match { subjects };
        self
    }
}

/// The accumulated output of a query; both maps are deduplicated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    /// Fetched claims keyed by claim CID.
    pub claims: HashMap<Cid, Delegation>,
    /// Fetched shard indexes keyed by claim context.
    pub indexes: HashMap<EncodedContextId, ShardedDagIndex>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty() && self.indexes.is_empty()
    }
}
