//! Command-line interface for the echocache binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use echocache::config::{Config, StoreBackend};
use echocache::gateway::OriginGateway;
use echocache::orchestrator::QueryOrchestrator;
use echocache::origin::{OpenAiProvider, OriginProvider};
use echocache::server::{self, AppState};
use echocache::store::{CacheStore, MemoryStore, RedisStore};
use echocache::strategy;
use echocache::ttl::ConstantTtl;

#[derive(Parser)]
#[command(
    name = "echocache",
    version,
    about = "Caching proxy for expensive LLM completions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (the default when no command is given).
    Serve,
    /// Resolve a single query from the terminal and print the result.
    Query {
        /// The query text, passed through verbatim.
        text: String,
        /// Bypass the cache lookup (the answer is still written back).
        #[arg(long)]
        force_refresh: bool,
    },
    /// Administrative cache store operations.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Remove a single cached query (exact key match).
    Delete { query: String },
    /// Print store statistics.
    Stats,
}

/// Run the HTTP server.
pub(crate) async fn cmd_serve(config: Config) -> Result<()> {
    let orchestrator = build_orchestrator(&config).context("failed to build query pipeline")?;
    server::serve(AppState { orchestrator }, &config.bind_addr)
        .await
        .context("http server failed")
}

/// One-shot query through the full orchestration path, no HTTP involved.
pub(crate) async fn cmd_query(config: Config, text: String, force_refresh: bool) -> Result<()> {
    let orchestrator = build_orchestrator(&config)?;
    let result = orchestrator.handle(&text, force_refresh).await;
    println!("{}", result.response);
    if let Some(total) = result.timing.get("total") {
        eprintln!("[source: {}, {:.3}s]", result.source, total);
    }
    Ok(())
}

/// Administrative store operations.
pub(crate) async fn cmd_cache(config: Config, action: CacheAction) -> Result<()> {
    let store = build_store(&config)?;
    match action {
        CacheAction::Delete { query } => {
            if store.delete(&query).await? {
                println!("Deleted.");
            } else {
                println!("No such key.");
            }
        }
        CacheAction::Stats => {
            let stats = store.stats().await?;
            println!("entries: {}", stats.entries);
        }
    }
    Ok(())
}

fn build_store(config: &Config) -> Result<Arc<dyn CacheStore>> {
    Ok(match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(&config.redis_host, config.redis_port)
                .context("failed to configure redis store")?,
        ),
    })
}

fn build_orchestrator(config: &Config) -> Result<QueryOrchestrator> {
    let api_key = config.require_openai_key()?;
    let provider: Arc<dyn OriginProvider> =
        Arc::new(OpenAiProvider::new(api_key, &config.openai_model));
    let store = build_store(config)?;
    let gateway = OriginGateway::new(
        provider,
        Arc::clone(&store),
        Arc::new(ConstantTtl::default()),
        config.disable_auto_cache,
    );
    Ok(QueryOrchestrator::new(
        strategy::for_mode(config.strategy, store),
        gateway,
    ))
}
