//! In-process cache store with per-key expiry.
//!
//! The dev/test backend. Entries are reaped lazily: an expired entry is
//! dropped the next time its key is read. Nothing is persisted.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{CacheStore, StoreStats};
use crate::error::Result;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Concurrent in-memory store keyed by raw query string.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        // The read guard must be released before remove_if below, so the
        // expiry decision is copied out of the match.
        let live = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if live.is_none() {
            self.entries
                .remove_if(key, |_, e| e.expires_at <= Instant::now());
        }
        Ok(live)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            entries: self.entries.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_get_absent_key_is_miss() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_round_trip() {
        let store = MemoryStore::new();
        store.set("q", "answer", TTL).await.unwrap();
        assert_eq!(store.get("q").await.unwrap(), Some("answer".to_string()));
    }

    #[tokio::test]
    async fn test_keys_are_exact_not_normalized() {
        let store = MemoryStore::new();
        store.set("What is Rust?", "a language", TTL).await.unwrap();
        assert_eq!(store.get("what is rust?").await.unwrap(), None);
        assert_eq!(store.get("What is Rust? ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entry_reads_as_miss_and_is_reaped() {
        let store = MemoryStore::new();
        store.set("q", "stale", Duration::ZERO).await.unwrap();
        assert_eq!(store.get("q").await.unwrap(), None);
        assert_eq!(store.stats().await.unwrap().entries, 0, "lazy reap on read");
    }

    #[tokio::test]
    async fn test_overwrite_last_writer_wins() {
        let store = MemoryStore::new();
        store.set("q", "first", TTL).await.unwrap();
        store.set("q", "second", TTL).await.unwrap();
        assert_eq!(store.get("q").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_key_existed() {
        let store = MemoryStore::new();
        store.set("q", "v", TTL).await.unwrap();
        assert!(store.delete("q").await.unwrap());
        assert!(!store.delete("q").await.unwrap());
        assert_eq!(store.get("q").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_stats_counts_entries() {
        let store = MemoryStore::new();
        store.set("a", "1", TTL).await.unwrap();
        store.set("b", "2", TTL).await.unwrap();
        assert_eq!(store.stats().await.unwrap().entries, 2);
    }
}
