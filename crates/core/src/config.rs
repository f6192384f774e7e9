//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Query engine configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Worker count for parallel traversal. Absent means serial traversal.
    #[serde(default)]
    pub concurrency: Option<usize>,
}

impl QueryConfig {
    /// Validate query configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == Some(0) {
            return Err("query.concurrency must be at least 1 when set".to_string());
        }
        Ok(())
    }
}

/// Cache TTL configuration for the three read-through stores.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL in seconds for cached provider results.
    #[serde(default = "default_provider_ttl_secs")]
    pub provider_ttl_secs: u64,
    /// TTL in seconds for cached claims.
    #[serde(default = "default_claim_ttl_secs")]
    pub claim_ttl_secs: u64,
    /// TTL in seconds for cached shard indexes.
    #[serde(default = "default_index_ttl_secs")]
    pub index_ttl_secs: u64,
}

fn default_provider_ttl_secs() -> u64 {
    86400 // 24 hours
}

fn default_claim_ttl_secs() -> u64 {
    7 * 86400
}

fn default_index_ttl_secs() -> u64 {
    7 * 86400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider_ttl_secs: default_provider_ttl_secs(),
            claim_ttl_secs: default_claim_ttl_secs(),
            index_ttl_secs: default_index_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn provider_ttl(&self) -> Duration {
        Duration::from_secs(self.provider_ttl_secs)
    }

    pub fn claim_ttl(&self) -> Duration {
        Duration::from_secs(self.claim_ttl_secs)
    }

    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_secs)
    }
}

/// HTTP fetcher configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Request timeout in seconds for claim and index fetches.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Routing index configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of the network content-routing index.
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,
}

fn default_routing_base_url() -> String {
    "https://cid.contact/".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_base_url(),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Query engine configuration.
    #[serde(default)]
    pub query: QueryConfig,
    /// Cache TTL configuration.
    #[serde(default)]
    pub cache: CacheConfig,
    /// HTTP fetcher configuration.
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Routing index configuration.
    #[serde(default)]
    pub routing: RoutingConfig,
}

impl AppConfig {
    /// Validate configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        self.query.validate()
    }

    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Serial traversal, short TTLs.
    pub fn for_testing() -> Self {
        Self {
            cache: CacheConfig {
                provider_ttl_secs: 60,
                claim_ttl_secs: 60,
                index_ttl_secs: 60,
            },
            ..Self::default()
        }
    }
}
