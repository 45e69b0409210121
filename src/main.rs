//! EchoCache binary entry point.

mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use echocache::config::Config;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => cli::cmd_serve(config).await,
        Command::Query {
            text,
            force_refresh,
        } => cli::cmd_query(config, text, force_refresh).await,
        Command::Cache { action } => cli::cmd_cache(config, action).await,
    }
}
