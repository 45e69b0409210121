//! Cache store adapters.
//!
//! [`CacheStore`] is the narrow seam over a key-value store with per-key
//! expiry. Results are three-state: `Ok(Some)` is a hit, `Ok(None)` a genuine
//! miss, and `Err` a store failure. Callers must not read a failure as a
//! miss; whether to fail open or closed is decided above this layer.
//!
//! Keys are raw query strings — no normalization, case and whitespace
//! sensitive. All operations are atomic at single-key granularity; there are
//! no multi-key transactions.

pub mod memory;
pub mod redis;

pub use self::redis::RedisStore;
pub use memory::MemoryStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Key-value store with per-key expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up a key. `Ok(None)` means the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a key with a lifetime. Overwrites any existing value; when two
    /// writers race on the same key, the last write wins.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Remove a key. Returns whether a key was actually removed.
    /// Administrative and test use only; the request path never deletes.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Aggregate statistics about the store.
    async fn stats(&self) -> Result<StoreStats>;
}

/// Store statistics for the admin CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreStats {
    /// Number of keys currently held (including not-yet-reaped expired
    /// entries for backends with lazy expiry).
    pub entries: u64,
}
