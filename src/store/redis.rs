//! Redis-backed cache store.
//!
//! The production backend. Expiry is delegated entirely to Redis via `EX`;
//! this adapter never inspects or rewrites deadlines. Connection failures
//! surface as [`EchoError::Store`] so callers can tell an unreachable store
//! apart from a genuine miss.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::{CacheStore, StoreStats};
use crate::error::{EchoError, Result};

/// Cache store speaking to a single Redis instance.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Create a store for `redis://{host}:{port}`.
    ///
    /// Only validates the URL; the first command opens the connection.
    pub fn connect(host: &str, port: u16) -> Result<Self> {
        let url = format!("redis://{host}:{port}");
        let client = redis::Client::open(url)
            .map_err(|e| EchoError::Store(format!("invalid redis URL: {e}")))?;
        Ok(Self { client })
    }

    async fn conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| EchoError::Store(format!("redis connection failed: {e}")))
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get(key)
            .await
            .map_err(|e| EchoError::Store(format!("redis GET failed: {e}")))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.conn().await?;
        // Redis rejects EX 0, and the TTL policy floors at one second anyway.
        let seconds = ttl.as_secs().max(1);
        let _: () = conn
            .set_ex(key, value, seconds)
            .await
            .map_err(|e| EchoError::Store(format!("redis SET failed: {e}")))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        let removed: u64 = conn
            .del(key)
            .await
            .map_err(|e| EchoError::Store(format!("redis DEL failed: {e}")))?;
        Ok(removed > 0)
    }

    async fn stats(&self) -> Result<StoreStats> {
        let mut conn = self.conn().await?;
        let entries: u64 = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(|e| EchoError::Store(format!("redis DBSIZE failed: {e}")))?;
        Ok(StoreStats { entries })
    }
}
