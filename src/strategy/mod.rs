//! Cache lookup strategies.
//!
//! A strategy decides whether a cached value may satisfy a query. Strategies
//! are read-only over the store — only the origin gateway writes. The mode is
//! resolved from `CACHING_STRATEGY` once at startup, so an unset or unknown
//! value degrades to the default lookup with a single diagnostic instead of
//! warning on every request.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::store::CacheStore;

/// Strategy selection, parsed from the `CACHING_STRATEGY` env value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    /// Bypass the cache entirely; every query goes to the origin. Used to
    /// force fresh generation, e.g. for isolated evaluation runs.
    NoCache,
    /// Serve only byte-identical query matches from the store.
    ExactMatchOnly,
    /// No explicit strategy configured; behaves as exact match.
    #[default]
    Default,
}

impl StrategyMode {
    /// Map the raw env value to a mode. Unset or unrecognized values resolve
    /// to [`StrategyMode::Default`] with a startup diagnostic — misconfigured
    /// deployments keep answering queries.
    pub fn from_env_value(raw: Option<&str>) -> Self {
        match raw {
            Some("no_cache") => Self::NoCache,
            Some("exact_match_only") => Self::ExactMatchOnly,
            Some(other) => {
                warn!(
                    "Unknown caching strategy '{}', using default exact-match lookup",
                    other
                );
                Self::Default
            }
            None => {
                warn!("CACHING_STRATEGY is not set, using default exact-match lookup");
                Self::Default
            }
        }
    }
}

/// A pluggable lookup policy.
///
/// `Ok(Some)` is a usable cached response, `Ok(None)` a miss, and `Err` a
/// store failure passed through distinctly — this layer never collapses a
/// failure into a miss. Implementations must not mutate cache state.
#[async_trait]
pub trait CacheStrategy: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<Option<String>>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Unconditional bypass: every lookup misses without touching the store.
#[derive(Debug, Default)]
pub struct NoCacheStrategy;

#[async_trait]
impl CacheStrategy for NoCacheStrategy {
    async fn lookup(&self, _query: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "no_cache"
    }
}

/// Byte-identical key lookup against the store.
pub struct ExactMatchStrategy {
    store: Arc<dyn CacheStore>,
}

impl ExactMatchStrategy {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CacheStrategy for ExactMatchStrategy {
    async fn lookup(&self, query: &str) -> Result<Option<String>> {
        self.store.get(query).await
    }

    fn name(&self) -> &'static str {
        "exact_match_only"
    }
}

/// Resolve a mode to a concrete strategy over `store`.
///
/// The mapping is closed: every mode resolves here, at construction time, so
/// the request path never branches on configuration strings.
pub fn for_mode(mode: StrategyMode, store: Arc<dyn CacheStore>) -> Arc<dyn CacheStrategy> {
    match mode {
        StrategyMode::NoCache => Arc::new(NoCacheStrategy),
        StrategyMode::ExactMatchOnly | StrategyMode::Default => {
            Arc::new(ExactMatchStrategy::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EchoError;
    use crate::store::{MemoryStore, MockCacheStore};
    use std::time::Duration;

    #[test]
    fn test_mode_parses_known_values() {
        assert_eq!(
            StrategyMode::from_env_value(Some("no_cache")),
            StrategyMode::NoCache
        );
        assert_eq!(
            StrategyMode::from_env_value(Some("exact_match_only")),
            StrategyMode::ExactMatchOnly
        );
    }

    #[test]
    fn test_mode_unknown_and_unset_map_to_default() {
        assert_eq!(
            StrategyMode::from_env_value(Some("vector_embedding")),
            StrategyMode::Default
        );
        assert_eq!(StrategyMode::from_env_value(None), StrategyMode::Default);
    }

    #[test]
    fn test_mode_is_case_sensitive() {
        // Config values are exact, like cache keys.
        assert_eq!(
            StrategyMode::from_env_value(Some("NO_CACHE")),
            StrategyMode::Default
        );
    }

    #[tokio::test]
    async fn test_no_cache_ignores_populated_store() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("q", "cached", Duration::from_secs(60))
            .await
            .unwrap();
        let strategy = for_mode(StrategyMode::NoCache, store);
        assert_eq!(strategy.lookup("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_cache_never_calls_the_store() {
        // A mock with no expectations panics on any call.
        let store: Arc<dyn CacheStore> = Arc::new(MockCacheStore::new());
        let strategy = for_mode(StrategyMode::NoCache, store);
        assert_eq!(strategy.lookup("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_exact_match_hits_and_misses() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        store
            .set("known", "answer", Duration::from_secs(60))
            .await
            .unwrap();
        let strategy = for_mode(StrategyMode::ExactMatchOnly, Arc::clone(&store));
        assert_eq!(
            strategy.lookup("known").await.unwrap(),
            Some("answer".to_string())
        );
        assert_eq!(strategy.lookup("unknown").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_default_mode_resolves_to_exact_match() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("q", "answer", Duration::from_secs(60))
            .await
            .unwrap();
        let strategy = for_mode(StrategyMode::Default, store);
        assert_eq!(strategy.name(), "exact_match_only");
        assert_eq!(
            strategy.lookup("q").await.unwrap(),
            Some("answer".to_string())
        );
    }

    #[tokio::test]
    async fn test_exact_match_propagates_store_errors() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .returning(|_| Err(EchoError::Store("connection refused".to_string())));
        let strategy = ExactMatchStrategy::new(Arc::new(store));
        assert!(matches!(
            strategy.lookup("q").await,
            Err(EchoError::Store(_))
        ));
    }
}
