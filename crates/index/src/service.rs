//! The indexing service: query decomposition, the job handler, and result
//! aggregation.
//!
//! A query becomes one job per input multihash. Each job looks up provider
//! records for its multihash (restricted to the claim protocols its kind may
//! act upon), fetches the backing claim for every block found, and spawns
//! follow-up jobs: the far side of an equals claim, the location of an index
//! blob, and the shards of a fetched index that contain the content.

use crate::blobindex::ShardIndexLookup;
use crate::claims::ClaimLookup;
use crate::error::IndexError;
use crate::fetch::UrlBuilder;
use crate::provider::{ProviderIndex, QueryKey};
use crate::walker::{
    JobHandler, JobWalker, ParallelWalker, SerialWalker, SharedState, Spawner, WalkError,
};
use async_trait::async_trait;
use cid::Cid;
use pharos_core::{
    ClaimBlock, Did, Multihash, ProviderRecord, Query, QueryResult, EQUALS_CLAIM_ID,
    INDEX_CLAIM_ID, LOCATION_COMMITMENT_ID, RAW_CODEC,
};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// What a job intends to do with the records it finds; constrains which
/// protocol blocks the handler will act upon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum JobKind {
    /// Opens the search on a user-supplied hash.
    Standard,
    /// Resolving the far side of an equals link; only the location matters.
    Location,
    /// Resolving an index blob's location, where an indirection via a further
    /// index claim is still meaningful but an equals chain is off-topic.
    EqualsOrLocation,
}

fn target_claims(kind: JobKind) -> &'static [u64] {
    match kind {
        JobKind::Standard => &[EQUALS_CLAIM_ID, INDEX_CLAIM_ID, LOCATION_COMMITMENT_ID],
        JobKind::Location => &[LOCATION_COMMITMENT_ID],
        JobKind::EqualsOrLocation => &[INDEX_CLAIM_ID, LOCATION_COMMITMENT_ID],
    }
}

#[derive(Clone, Debug)]
struct Job {
    mh: Multihash,
    /// Set when this job resolves the location of an index blob: the content
    /// multihash the index was claimed for.
    index_for_mh: Option<Multihash>,
    /// The record that carried the index claim, for the publish-back side
    /// effect of the index fetch.
    index_provider_record: Option<ProviderRecord>,
    kind: JobKind,
}

/// Deduplication identity. The same multihash visited with a different intent
/// must re-execute: it carries a different target-claim filter and different
/// downstream context.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct JobKey {
    mh: Multihash,
    kind: JobKind,
    index_for_mh: Option<Multihash>,
}

impl Job {
    fn standard(mh: Multihash) -> Self {
        Self {
            mh,
            index_for_mh: None,
            index_provider_record: None,
            kind: JobKind::Standard,
        }
    }

    fn location(mh: Multihash) -> Self {
        Self {
            mh,
            index_for_mh: None,
            index_provider_record: None,
            kind: JobKind::Location,
        }
    }

    fn key(&self) -> JobKey {
        JobKey {
            mh: self.mh,
            kind: self.kind,
            index_for_mh: self.index_for_mh,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct QueryState {
    result: QueryResult,
    visits: HashSet<JobKey>,
}

/// A failed query, carrying whatever was accumulated before the error.
#[derive(Debug, Error)]
#[error("query failed: {source}")]
pub struct QueryError {
    pub partial: QueryResult,
    #[source]
    pub source: IndexError,
}

struct Engine {
    provider_index: Arc<dyn ProviderIndex>,
    claim_lookup: Arc<dyn ClaimLookup>,
    shard_index_lookup: Arc<dyn ShardIndexLookup>,
    urls: Arc<dyn UrlBuilder>,
}

/// The engine bound to one query's fixed scope. The subject list never
/// changes during a walk, so it lives here rather than in the shared state;
/// handlers touch the accumulator only through `cmp_swap`.
struct QueryHandler {
    engine: Arc<Engine>,
    subjects: Vec<Did>,
}

#[async_trait]
impl JobHandler<Job, QueryState, IndexError> for QueryHandler {
    async fn handle(
        &self,
        job: Job,
        spawner: &Spawner<Job>,
        state: &SharedState<QueryState>,
    ) -> Result<(), IndexError> {
        // Skip already-visited nodes.
        let key = job.key();
        let first_visit = state.cmp_swap(
            |qs| !qs.visits.contains(&key),
            |qs| {
                qs.visits.insert(key.clone());
            },
        );
        if !first_visit {
            return Ok(());
        }

        let records = self
            .engine
            .provider_index
            .find(QueryKey {
                hash: job.mh,
                spaces: self.subjects.clone(),
                target_claims: target_claims(job.kind).to_vec(),
            })
            .await?;

        for record in records {
            // A provider may list several claim protocols for one multihash.
            let blocks = pharos_core::decode_metadata(&record.metadata)?;
            for block in blocks {
                // Fetch (from cache or origin) the claim backing this block
                // and record it if we don't already have it.
                let claim_cid = block.claim_cid();
                let url = self.engine.urls.claim_url(&record.provider, &claim_cid)?;
                let claim = self
                    .engine
                    .claim_lookup
                    .lookup_claim(&claim_cid, &url)
                    .await?;
                state.cmp_swap(
                    |qs| !qs.result.claims.contains_key(&claim_cid),
                    |qs| {
                        qs.result.claims.insert(claim_cid, claim.clone());
                    },
                );

                match block {
                    ClaimBlock::Equals(equals) => {
                        // An equals claim is published under both multihashes;
                        // follow with a location query for the OTHER side.
                        if equals.equals != job.mh {
                            spawner.spawn(Job::location(equals.equals));
                        } else {
                            // Lookup was the equals hash; the content hash is
                            // encoded in the record's context identifier.
                            match record.context_id.to_multihash() {
                                Ok(content_mh) => spawner.spawn(Job::location(content_mh)),
                                Err(_) => tracing::debug!(
                                    context_id = %record.context_id,
                                    "equals-claim context id is not a multihash, skipping content-side lookup"
                                ),
                            }
                        }
                    }
                    ClaimBlock::Index(index) => {
                        // Follow by resolving the index blob's own location so
                        // it can be fetched.
                        spawner.spawn(Job {
                            mh: index.index,
                            index_for_mh: Some(job.mh),
                            index_provider_record: Some(record.clone()),
                            kind: JobKind::EqualsOrLocation,
                        });
                    }
                    ClaimBlock::Location(location) => {
                        // Terminal unless this is the location of an index blob.
                        let (Some(index_for), Some(index_record)) =
                            (&job.index_for_mh, &job.index_provider_record)
                        else {
                            continue;
                        };

                        let shard_cid = location
                            .shard
                            .unwrap_or_else(|| Cid::new_v1(RAW_CODEC, job.mh));
                        let url = self
                            .engine
                            .urls
                            .retrieval_url(&record.provider, &shard_cid)?;
                        let index = self
                            .engine
                            .shard_index_lookup
                            .find(&record.context_id, index_record, &url, location.range.as_ref())
                            .await?;
                        state.cmp_swap(
                            |qs| !qs.result.indexes.contains_key(&record.context_id),
                            |qs| {
                                qs.result
                                    .indexes
                                    .insert(record.context_id.clone(), index.clone());
                            },
                        );

                        // Locate every shard that holds the content the index
                        // was claimed for.
                        for (shard_mh, slices) in index.shards() {
                            if slices.has(index_for) {
                                spawner.spawn(Job {
                                    mh: *shard_mh,
                                    index_for_mh: None,
                                    index_provider_record: None,
                                    kind: JobKind::EqualsOrLocation,
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Read logic for indexing data across the routing index, content claims,
/// sharded DAG indexes, and the cache layer.
pub struct IndexingService {
    engine: Arc<Engine>,
    walker: Arc<dyn JobWalker<Job, QueryState, IndexError>>,
}

impl IndexingService {
    /// A service using serial traversal (the deterministic default).
    pub fn new(
        provider_index: Arc<dyn ProviderIndex>,
        claim_lookup: Arc<dyn ClaimLookup>,
        shard_index_lookup: Arc<dyn ShardIndexLookup>,
        urls: Arc<dyn UrlBuilder>,
    ) -> Self {
        Self {
            engine: Arc::new(Engine {
                provider_index,
                claim_lookup,
                shard_index_lookup,
                urls,
            }),
            walker: Arc::new(SerialWalker),
        }
    }

    /// Process queries with a parallel worker pool of the given size.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.walker = Arc::new(ParallelWalker::new(concurrency));
        self
    }

    /// Resolve all claims and indexes reachable from the query's multihashes.
    ///
    /// On failure the error carries the partially-accumulated result. The
    /// contents of a partial result depend on scheduling and must not be
    /// relied upon beyond set membership.
    #[tracing::instrument(skip(self, query), fields(hashes = query.hashes.len()))]
    pub async fn query(&self, query: Query) -> Result<QueryResult, QueryError> {
        let initial: Vec<Job> = query.hashes.iter().copied().map(Job::standard).collect();
        let handler: Arc<dyn JobHandler<Job, QueryState, IndexError>> = Arc::new(QueryHandler {
            engine: self.engine.clone(),
            subjects: query.scope.subjects,
        });

        let (state, outcome) = self
            .walker
            .walk(
                CancellationToken::new(),
                initial,
                QueryState::default(),
                handler,
            )
            .await;

        match outcome {
            Ok(()) => Ok(state.result),
            Err(WalkError::Handler(source)) => Err(QueryError {
                partial: state.result,
                source,
            }),
            Err(WalkError::Cancelled) => Err(QueryError {
                partial: state.result,
                source: IndexError::Cancelled,
            }),
        }
    }
}
