//! Key/value cache stores for Pharos.
//!
//! This crate provides:
//! - The `KvClient` trait over an expirable key/value transport
//! - An in-memory backend with TTL semantics
//! - A typed `Store<K, V>` wrapper binding codecs to a client
//! - Typed store constructors for provider records, claims, and shard indexes

pub mod client;
pub mod error;
pub mod memory;
pub mod store;
pub mod stores;

pub use client::KvClient;
pub use error::{CacheError, CacheResult};
pub use memory::MemoryClient;
pub use store::Store;
pub use stores::{claim_store, provider_store, shard_index_store};
pub use stores::{ClaimStore, ProviderStore, ShardIndexStore};
