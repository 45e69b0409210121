//! Origin gateway: invokes the completion service and populates the cache.
//!
//! `complete` never returns an error. Origin failures become the fixed
//! [`FALLBACK_MESSAGE`](crate::origin::FALLBACK_MESSAGE) with the `degraded`
//! flag set, and cache population is best-effort — a failed write is logged
//! and the response is returned regardless.
//!
//! Population is not serialized across requests: two concurrent misses on the
//! same query may both reach the origin and both write the key. That race is
//! an invariant, not a bug — responses are idempotent per query, so
//! at-least-once population with last-writer-wins is acceptable.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::origin::{OriginProvider, FALLBACK_MESSAGE};
use crate::store::CacheStore;
use crate::ttl::TtlPolicy;

/// Outcome of an origin call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    /// Completion text, or the fixed fallback when `degraded` is set.
    pub text: String,
    /// True when the origin failed and `text` is the fallback. The result
    /// source still reads `origin`; this flag is the only way to tell a
    /// graceful-degradation message from a genuine answer.
    pub degraded: bool,
}

/// Invokes the origin service and writes successful answers back to cache.
#[derive(Clone)]
pub struct OriginGateway {
    provider: Arc<dyn OriginProvider>,
    store: Arc<dyn CacheStore>,
    ttl: Arc<dyn TtlPolicy>,
    writes_disabled: bool,
}

impl OriginGateway {
    /// `writes_disabled` suppresses cache population (reads are unaffected);
    /// set from `DISABLE_AUTO_CACHE` so evaluation runs stay independent.
    pub fn new(
        provider: Arc<dyn OriginProvider>,
        store: Arc<dyn CacheStore>,
        ttl: Arc<dyn TtlPolicy>,
        writes_disabled: bool,
    ) -> Self {
        Self {
            provider,
            store,
            ttl,
            writes_disabled,
        }
    }

    /// Complete `query` at the origin.
    ///
    /// On success the (query, response) pair is written to the store with the
    /// TTL policy's lifetime before returning. On origin failure the fixed
    /// fallback is returned with `degraded = true`.
    pub async fn complete(&self, query: &str) -> GatewayReply {
        match self.provider.complete(query).await {
            Ok(text) => {
                self.populate(query, &text).await;
                GatewayReply {
                    text,
                    degraded: false,
                }
            }
            Err(e) => {
                error!("Origin completion via {} failed: {e}", self.provider.name());
                GatewayReply {
                    text: FALLBACK_MESSAGE.to_string(),
                    degraded: true,
                }
            }
        }
    }

    async fn populate(&self, query: &str, text: &str) {
        if self.writes_disabled {
            debug!("Cache writes disabled, skipping population");
            return;
        }
        let ttl = self.ttl.ttl_for(query);
        if let Err(e) = self.store.set(query, text, ttl).await {
            warn!("Best-effort cache write failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EchoError;
    use crate::origin::MockOriginProvider;
    use crate::store::{MemoryStore, MockCacheStore};
    use crate::ttl::ConstantTtl;
    use std::time::Duration;

    fn gateway_with(
        provider: MockOriginProvider,
        store: Arc<dyn CacheStore>,
        writes_disabled: bool,
    ) -> OriginGateway {
        OriginGateway::new(
            Arc::new(provider),
            store,
            Arc::new(ConstantTtl::default()),
            writes_disabled,
        )
    }

    fn provider_answering(text: &'static str) -> MockOriginProvider {
        let mut provider = MockOriginProvider::new();
        provider
            .expect_complete()
            .returning(move |_| Ok(text.to_string()));
        provider.expect_name().return_const("mock");
        provider
    }

    fn provider_failing() -> MockOriginProvider {
        let mut provider = MockOriginProvider::new();
        provider
            .expect_complete()
            .returning(|_| Err(EchoError::Origin("boom".to_string())));
        provider.expect_name().return_const("mock");
        provider
    }

    #[tokio::test]
    async fn test_success_returns_text_and_populates_store() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let gateway = gateway_with(provider_answering("Paris."), Arc::clone(&store), false);

        let reply = gateway.complete("capital of France?").await;
        assert_eq!(reply.text, "Paris.");
        assert!(!reply.degraded);
        assert_eq!(
            store.get("capital of France?").await.unwrap(),
            Some("Paris.".to_string())
        );
    }

    #[tokio::test]
    async fn test_failure_returns_fallback_and_writes_nothing() {
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let gateway = gateway_with(provider_failing(), Arc::clone(&store), false);

        let reply = gateway.complete("q").await;
        assert_eq!(reply.text, FALLBACK_MESSAGE);
        assert!(reply.degraded);
        assert_eq!(store.get("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_failure_does_not_affect_reply() {
        let mut store = MockCacheStore::new();
        store
            .expect_set()
            .returning(|_, _, _| Err(EchoError::Store("redis down".to_string())));
        let gateway = gateway_with(provider_answering("answer"), Arc::new(store), false);

        let reply = gateway.complete("q").await;
        assert_eq!(reply.text, "answer");
        assert!(!reply.degraded);
    }

    #[tokio::test]
    async fn test_disabled_writes_skip_the_store() {
        let mut store = MockCacheStore::new();
        // No expect_set: any write would panic the mock.
        store.expect_set().never();
        let gateway = gateway_with(provider_answering("answer"), Arc::new(store), true);

        let reply = gateway.complete("q").await;
        assert_eq!(reply.text, "answer");
    }

    #[tokio::test]
    async fn test_population_uses_policy_ttl() {
        let mut store = MockCacheStore::new();
        store
            .expect_set()
            .withf(|key, value, ttl| {
                key == "q" && value == "answer" && *ttl == Duration::from_secs(2_592_000)
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let gateway = gateway_with(provider_answering("answer"), Arc::new(store), false);

        gateway.complete("q").await;
    }

    #[tokio::test]
    async fn test_concurrent_same_key_populations_both_complete() {
        // Both callers may reach the origin; last writer wins on the store.
        let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
        let mut provider = MockOriginProvider::new();
        provider
            .expect_complete()
            .times(2)
            .returning(|_| Ok("same answer".to_string()));
        provider.expect_name().return_const("mock");
        let gateway = gateway_with(provider, Arc::clone(&store), false);

        let (a, b) = tokio::join!(gateway.complete("q"), gateway.complete("q"));
        assert_eq!(a.text, "same answer");
        assert_eq!(b.text, "same answer");
        assert_eq!(
            store.get("q").await.unwrap(),
            Some("same answer".to_string())
        );
    }
}
