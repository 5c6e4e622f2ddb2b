//! In-memory cache implementation with LRU eviction.
//!
//! Thread-safe cache using tokio synchronization primitives. Entries carry an
//! optional TTL and expire lazily on access.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;
use tokio::time::Instant;

use repotrack_core::cache::{Cache, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Uses LRU eviction to bound memory once `max_entries` is reached.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache. A capacity of zero is raised to one.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }

    /// Number of stored entries, expired ones included.
    pub async fn entry_count(&self) -> usize {
        self.store.read().await.len()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;

        let expired = match store.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            store.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, keys: &[&str]) -> Result<()> {
        let mut store = self.store.write().await;
        for key in keys {
            store.pop(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Default max entries for tests
    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:1", b"ann", None).await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), Some(b"ann".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert_eq!(cache.get("user:404").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_many_keys() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("user:1", b"ann", None).await.unwrap();
        cache.set("users:all", b"[]", None).await.unwrap();
        cache.set("user:2", b"bob", None).await.unwrap();

        cache.delete(&["user:1", "users:all", "user:404"]).await.unwrap();

        assert!(cache.get("user:1").await.unwrap().is_none());
        assert!(cache.get("users:all").await.unwrap().is_none());
        assert!(cache.get("user:2").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache
            .set("repository:1", b"tracker", Some(Duration::from_secs(600)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(cache.get("repository:1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("repository:1").await.unwrap().is_none());
        assert_eq!(cache.entry_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ttl_never_expires() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("users:all", b"[]", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(86_400)).await;

        assert!(cache.get("users:all").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.set("user:1", b"old", None).await.unwrap();
        cache.set("user:1", b"new", None).await.unwrap();

        assert_eq!(cache.get("user:1").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2);
        cache.set("user:1", b"1", None).await.unwrap();
        cache.set("user:2", b"2", None).await.unwrap();

        // Touch user:1 so user:2 becomes least recently used.
        cache.get("user:1").await.unwrap();
        cache.set("user:3", b"3", None).await.unwrap();

        assert!(cache.get("user:1").await.unwrap().is_some());
        assert!(cache.get("user:2").await.unwrap().is_none());
        assert!(cache.get("user:3").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_raised() {
        let cache = MemoryCache::new(0);
        cache.set("user:1", b"1", None).await.unwrap();
        assert!(cache.get("user:1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ping_is_always_ok() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert!(cache.ping().await.is_ok());
    }
}
