//! Process configuration.
//!
//! Everything is read from the environment once at startup (a `.env` file is
//! loaded first when present) and the resulting snapshot is immutable for the
//! life of the process. Requests never re-read the environment.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EchoError, Result};
use crate::strategy::StrategyMode;

/// Which cache store backend to run against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map with per-key expiry. No persistence; dev and test.
    #[default]
    Memory,
    /// Redis with native `EX` expiry. The production backend.
    Redis,
}

/// Immutable configuration snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache strategy selected via `CACHING_STRATEGY`.
    pub strategy: StrategyMode,
    /// When set, cache writes are suppressed (reads are unaffected).
    /// Used by external evaluation harnesses to keep runs independent.
    pub disable_auto_cache: bool,
    /// Store backend selection.
    pub backend: StoreBackend,
    /// Redis host. The default `redis` matches the docker-compose service
    /// name; set to `localhost` to reach the container from outside.
    pub redis_host: String,
    /// Redis port.
    pub redis_port: u16,
    /// API key for the origin completion service.
    pub openai_api_key: Option<String>,
    /// Model requested from the origin completion service.
    pub openai_model: String,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: StrategyMode::default(),
            disable_auto_cache: false,
            backend: StoreBackend::default(),
            redis_host: "redis".to_string(),
            redis_port: 6379,
            openai_api_key: None,
            openai_model: "gpt-4o".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Build a configuration snapshot from the process environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let strategy =
            StrategyMode::from_env_value(std::env::var("CACHING_STRATEGY").ok().as_deref());

        let disable_auto_cache = std::env::var("DISABLE_AUTO_CACHE")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let redis_host = std::env::var("REDIS_HOST").ok();
        let backend = match std::env::var("CACHE_BACKEND").ok().as_deref() {
            Some("redis") => StoreBackend::Redis,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                warn!("Unknown CACHE_BACKEND '{}', using in-memory store", other);
                StoreBackend::Memory
            }
            // Unset: an explicit REDIS_HOST implies the redis backend, which
            // keeps the docker-compose deployment working with no extra vars.
            None if redis_host.is_some() => StoreBackend::Redis,
            None => StoreBackend::Memory,
        };

        let redis_port = std::env::var("REDIS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.redis_port);

        Self {
            strategy,
            disable_auto_cache,
            backend,
            redis_host: redis_host.unwrap_or(defaults.redis_host),
            redis_port,
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }

    /// Return the origin API key or a config error naming the missing var.
    pub fn require_openai_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| EchoError::Config("OPENAI_API_KEY is not set".to_string()))
    }
}

/// Accepts the usual spellings of "on" for flag-style env vars.
fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
