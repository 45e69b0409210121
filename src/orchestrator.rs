//! Query orchestration: cache-or-origin decision flow.
//!
//! Each request walks a two-state machine, `checking-cache` → `resolved`:
//! force-refresh skips straight to the origin; otherwise the strategy is
//! consulted and a miss falls through to the gateway. Whatever happens, the
//! caller gets a well-formed [`QueryResult`] — failures below this layer are
//! absorbed into the `error` source, never propagated.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::gateway::OriginGateway;
use crate::strategy::CacheStrategy;

/// User-facing text for the `error` source.
pub const ERROR_MESSAGE: &str =
    "Something went wrong while answering this query. Please try again later.";

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Origin,
    Error,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Cache => "cache",
            Self::Origin => "origin",
            Self::Error => "error",
        })
    }
}

/// The resolved outcome of one query. Immutable once returned.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub response: String,
    pub source: Source,
    /// True when the response is the origin fallback text rather than a
    /// genuine answer. Internal metadata — not exposed on the wire, where
    /// `source` still reads `origin`.
    pub degraded: bool,
    /// Stage durations in seconds. Keys are present only for stages that
    /// ran; `total` is always present.
    pub timing: HashMap<String, f64>,
}

impl QueryResult {
    fn internal_error(total: Duration) -> Self {
        let mut timing = HashMap::new();
        timing.insert("total".to_string(), total.as_secs_f64());
        Self {
            response: ERROR_MESSAGE.to_string(),
            source: Source::Error,
            degraded: false,
            timing,
        }
    }
}

/// Top-level per-query decision flow.
#[derive(Clone)]
pub struct QueryOrchestrator {
    strategy: Arc<dyn CacheStrategy>,
    gateway: OriginGateway,
}

impl QueryOrchestrator {
    pub fn new(strategy: Arc<dyn CacheStrategy>, gateway: OriginGateway) -> Self {
        Self { strategy, gateway }
    }

    /// Resolve one query to a result. Never fails.
    ///
    /// Resolution runs on its own task: a caller that disconnects cannot
    /// cancel an in-flight origin call or cache write partway through, and a
    /// panic below this boundary resolves as `source: error` instead of
    /// escaping to the transport.
    pub async fn handle(&self, query: &str, force_refresh: bool) -> QueryResult {
        let started = Instant::now();
        let this = self.clone();
        let query = query.to_string();
        let task = tokio::spawn(async move { this.resolve(&query, force_refresh).await });
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!("Query resolution task failed: {e}");
                QueryResult::internal_error(started.elapsed())
            }
        }
    }

    async fn resolve(&self, query: &str, force_refresh: bool) -> QueryResult {
        let total_started = Instant::now();
        let mut timing = HashMap::new();

        if force_refresh {
            debug!("Force refresh requested, skipping cache lookup");
        } else {
            let lookup_started = Instant::now();
            let looked_up = self.strategy.lookup(query).await;
            timing.insert(
                "cache_lookup".to_string(),
                lookup_started.elapsed().as_secs_f64(),
            );
            match looked_up {
                Ok(Some(response)) => {
                    timing.insert("total".to_string(), total_started.elapsed().as_secs_f64());
                    return QueryResult {
                        response,
                        source: Source::Cache,
                        degraded: false,
                        timing,
                    };
                }
                Ok(None) => {}
                // Fail open: an unreachable store must not take queries down
                // with it. The origin path below still answers.
                Err(e) => warn!(
                    "Cache lookup via {} failed, failing open: {e}",
                    self.strategy.name()
                ),
            }
        }

        let origin_started = Instant::now();
        let reply = self.gateway.complete(query).await;
        timing.insert(
            "origin_call".to_string(),
            origin_started.elapsed().as_secs_f64(),
        );
        timing.insert("total".to_string(), total_started.elapsed().as_secs_f64());

        QueryResult {
            response: reply.text,
            source: Source::Origin,
            degraded: reply.degraded,
            timing,
        }
    }
}
