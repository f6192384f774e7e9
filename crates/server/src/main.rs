//! Pharos server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use pharos_cache::{claim_store, provider_store, shard_index_store, MemoryClient};
use pharos_core::config::AppConfig;
use pharos_index::{
    CachingClaimLookup, CachingProviderIndex, CachingShardIndexLookup, Fetcher, HttpFetcher,
    HttpRoutingClient, IndexingService, NoopAdvertiser, StandardUrlBuilder,
};
use pharos_server::{create_router, AppState};
use reqwest::Url;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pharos - a content-claims indexing service
#[derive(Parser, Debug)]
#[command(name = "pharosd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "PHAROS_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

fn load_config(path: &str) -> Result<AppConfig> {
    let mut figment = Figment::new();
    if Path::new(path).exists() {
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed("PHAROS_").split("__"));
    let config: AppConfig = figment.extract().context("failed to load configuration")?;
    config
        .validate()
        .map_err(|error| anyhow::anyhow!("invalid configuration: {error}"))?;
    Ok(config)
}

fn build_service(config: &AppConfig) -> Result<IndexingService> {
    let routing_url: Url = config
        .routing
        .base_url
        .parse()
        .context("invalid routing.base_url")?;
    let timeout = config.fetch.timeout();

    let routing = Arc::new(HttpRoutingClient::new(routing_url, timeout)?);
    let provider_index = Arc::new(CachingProviderIndex::new(
        provider_store(Arc::new(MemoryClient::new(config.cache.provider_ttl()))),
        routing,
        Arc::new(NoopAdvertiser),
    ));

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(timeout)?);
    let claim_lookup = Arc::new(CachingClaimLookup::new(
        claim_store(Arc::new(MemoryClient::new(config.cache.claim_ttl()))),
        fetcher.clone(),
    ));
    let shard_index_lookup = Arc::new(CachingShardIndexLookup::new(
        shard_index_store(Arc::new(MemoryClient::new(config.cache.index_ttl()))),
        fetcher,
        provider_index.clone(),
    ));

    let mut service = IndexingService::new(
        provider_index,
        claim_lookup,
        shard_index_lookup,
        Arc::new(StandardUrlBuilder),
    );
    if let Some(concurrency) = config.query.concurrency {
        service = service.with_concurrency(concurrency);
    }
    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    let service = build_service(&config)?;
    let bind = config.server.bind.clone();
    let state = AppState::new(config, Arc::new(service));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "pharos indexing service listening");

    axum::serve(listener, create_router(state))
        .await
        .context("server error")?;
    Ok(())
}
