//! Read and mutation pipelines.
//!
//! Reads go cache first, then through the breaker to the store, then back
//! into the cache. Mutations validate, persist through the breaker,
//! invalidate the touched keys and emit one event. Only validation,
//! breaker-open and store errors reach the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use repotrack_core::pipeline::{PipelineError, Result};
use repotrack_core::storage::{Result as StoreResult, StoreError};

use crate::resilience::CircuitBreaker;

mod cache_manager;
mod emitter;
mod repositories;
mod users;

#[cfg(test)]
pub(crate) mod test_support;

pub use cache_manager::CacheManager;
pub use emitter::EventEmitter;
pub use repositories::RepositoryPipeline;
pub use users::UserPipeline;

/// Collaborators every pipeline needs besides its store.
#[derive(Clone)]
pub struct PipelineDeps {
    pub breaker: Arc<CircuitBreaker>,
    pub cache: CacheManager,
    pub events: EventEmitter,
    pub store_timeout: Duration,
}

impl PipelineDeps {
    /// Runs one store call behind the breaker, bounded by the store deadline.
    ///
    /// An elapsed deadline is a `StoreError::Timeout` and counts against the breaker.
    pub(crate) async fn guarded<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let deadline = self.store_timeout;
        self.breaker
            .execute(|| async move {
                tokio::time::timeout(deadline, call())
                    .await
                    .unwrap_or_else(|_| Err(StoreError::Timeout(deadline.as_millis() as u64)))
            })
            .await
            .map_err(PipelineError::from)
    }

    /// Cache-aside read of one key.
    ///
    /// `None` from the store is returned as is and never cached.
    pub(crate) async fn read_through<T, F, Fut>(&self, key: &str, load: F) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = StoreResult<Option<T>>>,
    {
        if let Some(hit) = self.cache.fetch::<T>(key).await {
            return Ok(Some(hit));
        }

        let loaded = self.guarded(load).await?;
        if let Some(value) = &loaded {
            self.cache.store(key, value).await;
        }
        Ok(loaded)
    }
}

#[cfg(test)]
pub(crate) fn test_deps(
    cache: Arc<dyn repotrack_core::cache::Cache>,
    publisher: Arc<dyn repotrack_core::events::EventPublisher>,
) -> PipelineDeps {
    use repotrack_core::breaker::BreakerConfig;

    PipelineDeps {
        breaker: Arc::new(CircuitBreaker::new("store", BreakerConfig::default())),
        cache: CacheManager::new(cache, Duration::from_secs(600), Duration::from_millis(500)),
        events: EventEmitter::new(publisher, Duration::from_secs(2)),
        store_timeout: Duration::from_secs(5),
    }
}
