//! Read-through cache helper.
//!
//! Every backend call runs under a deadline. Failures are logged and never
//! reach the caller: a failed read is a miss, a failed write or delete is a
//! no-op.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use repotrack_core::cache::{
    deserialize_value, serialize_value, Cache, CacheError, Result as CacheResult,
};

#[derive(Clone)]
pub struct CacheManager {
    cache: Arc<dyn Cache>,
    ttl: Duration,
    timeout: Duration,
}

impl CacheManager {
    /// Creates a manager writing entries with `ttl` and bounding every call by `timeout`.
    pub fn new(cache: Arc<dyn Cache>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            cache,
            ttl,
            timeout,
        }
    }

    /// Returns the decoded value under `key`, or `None` on miss.
    ///
    /// Unreachable backends and undecodable entries are misses too.
    pub async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.bounded(self.cache.get(key)).await {
            Ok(Some(bytes)) => match deserialize_value::<T>(&bytes) {
                Ok(value) => {
                    tracing::trace!(%key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    tracing::warn!(%key, error = %err, "Cached value could not be decoded, treating as miss");
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(%key, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(%key, error = %err, "Cache read failed, treating as miss");
                None
            }
        }
    }

    /// Writes `value` under `key` with the configured TTL.
    pub async fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let bytes = match serialize_value(value) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%key, error = %err, "Failed to encode value for cache");
                return;
            }
        };

        if let Err(err) = self
            .bounded(self.cache.set(key, &bytes, Some(self.ttl)))
            .await
        {
            tracing::warn!(%key, error = %err, "Failed to populate cache");
        }
    }

    /// Deletes every listed key.
    pub async fn invalidate(&self, keys: &[&str]) {
        match self.bounded(self.cache.delete(keys)).await {
            Ok(()) => tracing::trace!(?keys, "Cache invalidated"),
            Err(err) => tracing::warn!(?keys, error = %err, "Failed to invalidate cache"),
        }
    }

    /// Readiness probe for the cache backend.
    pub async fn ping(&self) -> CacheResult<()> {
        self.bounded(self.cache.ping()).await
    }

    async fn bounded<R>(&self, call: impl Future<Output = CacheResult<R>>) -> CacheResult<R> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| Err(CacheError::Timeout(self.timeout.as_millis() as u64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryCache;
    use crate::pipeline::test_support::{FailingCache, StalledCache};

    use repotrack_core::domain::User;

    fn manager(cache: Arc<dyn Cache>) -> CacheManager {
        CacheManager::new(cache, Duration::from_secs(600), Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_store_then_fetch() {
        let manager = manager(Arc::new(MemoryCache::new(16)));
        let user = User::new(1, "Ann Lee", "ann@example.com");

        manager.store("user:1", &user).await;

        assert_eq!(manager.fetch::<User>("user:1").await, Some(user));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_miss() {
        let cache = Arc::new(MemoryCache::new(16));
        cache.set("user:1", b"{not json", None).await.unwrap();
        let manager = manager(cache);

        assert_eq!(manager.fetch::<User>("user:1").await, None);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_miss() {
        let cache = Arc::new(MemoryCache::new(16));
        cache.set("user:1", br#"{"id":"one"}"#, None).await.unwrap();
        let manager = manager(cache);

        assert_eq!(manager.fetch::<User>("user:1").await, None);
    }

    #[tokio::test]
    async fn test_failing_backend_is_swallowed() {
        let manager = manager(Arc::new(FailingCache));
        let user = User::new(1, "Ann Lee", "ann@example.com");

        manager.store("user:1", &user).await;
        manager.invalidate(&["user:1", "users:all"]).await;

        assert_eq!(manager.fetch::<User>("user:1").await, None);
        assert!(manager.ping().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_backend_times_out() {
        let manager = manager(Arc::new(StalledCache));

        assert_eq!(manager.fetch::<User>("user:1").await, None);
        assert_eq!(manager.ping().await, Err(CacheError::Timeout(500)));
    }

    #[tokio::test]
    async fn test_invalidate_removes_keys() {
        let cache = Arc::new(MemoryCache::new(16));
        let manager = manager(cache.clone());
        manager.store("users:all", &Vec::<User>::new()).await;
        manager.store("user:1", &User::new(1, "Ann Lee", "ann@example.com")).await;

        manager.invalidate(&["user:1", "users:all"]).await;

        assert!(cache.get("users:all").await.unwrap().is_none());
        assert!(cache.get("user:1").await.unwrap().is_none());
    }
}
