//! Application state and backend wiring.
//!
//! Defines the shared state passed to every handler. Pipelines are held as
//! service trait objects, so handlers never see which store, cache or
//! publisher backend the binary was built with.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use repotrack_core::cache::Cache;
use repotrack_core::events::{EventPublisher, EventSubscriber};
use repotrack_core::pipeline::{RepositoryService, UserService};
use repotrack_core::storage::{RepositoryStore, StoreHealth, UserStore};

use crate::config::{BreakerScope, Config};
use crate::pipeline::{CacheManager, EventEmitter, PipelineDeps, RepositoryPipeline, UserPipeline};
use crate::resilience::CircuitBreaker;

/// Shared application state.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserService>,
    pub repositories: Arc<dyn RepositoryService>,
    /// Store liveness, for the readiness probe.
    pub store_health: Arc<dyn StoreHealth>,
    /// Cache handle, for the readiness probe.
    pub cache: CacheManager,
    /// Source of published events for the event log.
    pub subscriber: Arc<dyn EventSubscriber>,
    /// Every distinct breaker in use, one when shared.
    pub breakers: Vec<Arc<CircuitBreaker>>,
    pub store_timeout: Duration,
    pub request_timeout: Duration,
    /// Shutdown signal sender for background tasks.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl AppState {
    /// Wires pipelines over one store, one cache and one publisher.
    pub(crate) fn build<S, P>(
        store: Arc<S>,
        cache: Arc<dyn Cache>,
        publisher: Arc<P>,
        config: &Config,
    ) -> Self
    where
        S: UserStore + RepositoryStore + StoreHealth + 'static,
        P: EventPublisher + EventSubscriber + 'static,
    {
        let breaker_config = config.breaker();
        let (users_breaker, repositories_breaker) = match config.breaker_scope {
            BreakerScope::Shared => {
                let breaker = Arc::new(CircuitBreaker::new("store", breaker_config));
                (breaker.clone(), breaker)
            }
            BreakerScope::PerEntity => (
                Arc::new(CircuitBreaker::new("users", breaker_config.clone())),
                Arc::new(CircuitBreaker::new("repositories", breaker_config)),
            ),
        };

        let breakers = if Arc::ptr_eq(&users_breaker, &repositories_breaker) {
            vec![users_breaker.clone()]
        } else {
            vec![users_breaker.clone(), repositories_breaker.clone()]
        };

        let cache = CacheManager::new(cache, config.cache_ttl(), config.cache_timeout());
        let events = EventEmitter::new(publisher.clone(), config.publish_timeout());
        let deps = |breaker: Arc<CircuitBreaker>| PipelineDeps {
            breaker,
            cache: cache.clone(),
            events: events.clone(),
            store_timeout: config.store_timeout(),
        };

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            users: Arc::new(UserPipeline::new(store.clone(), deps(users_breaker))),
            repositories: Arc::new(RepositoryPipeline::new(
                store.clone(),
                deps(repositories_breaker),
            )),
            store_health: store,
            cache,
            subscriber: publisher,
            breakers,
            store_timeout: config.store_timeout(),
            request_timeout: config.request_timeout(),
            shutdown_tx,
        }
    }

    /// Subscribe to shutdown signal.
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signal background tasks to shut down.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Spawns the task that logs every published domain event.
    ///
    /// Runs until shutdown is signalled or the event channel closes.
    pub async fn spawn_event_logger(&self) -> anyhow::Result<JoinHandle<()>> {
        let mut receiver = self.subscriber.subscribe().await?;
        let mut shutdown_rx = self.subscribe_shutdown();

        Ok(tokio::spawn(async move {
            tracing::debug!("Event logger started");

            loop {
                tokio::select! {
                    result = receiver.recv() => {
                        match result {
                            Ok(event) => {
                                tracing::info!(
                                    topic = %event.topic,
                                    key = %event.key,
                                    payload = %event.payload,
                                    "Domain event"
                                );
                            }
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                tracing::warn!(lagged = n, "Event logger lagged");
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                tracing::info!("Event channel closed");
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        tracing::debug!("Event logger shutting down");
                        break;
                    }
                }
            }
        }))
    }
}

// ============================================================================
// Factory functions for different backend combinations
// ============================================================================

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;

    use crate::cache::memory::{MemoryCache, MemoryPublisher};
    use crate::storage::InMemoryStore;

    impl AppState {
        /// Creates AppState with in-memory storage and cache.
        /// Useful for development without any external dependencies.
        pub async fn new(config: &Config) -> anyhow::Result<Self> {
            let store = Arc::new(InMemoryStore::new());
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let publisher = Arc::new(MemoryPublisher::new(config.event_channel_capacity));

            Ok(Self::build(store, cache, publisher, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;

    use crate::cache::redis_impl::{RedisCache, RedisPublisher};
    use crate::storage::InMemoryStore;

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache.
        pub async fn new(config: &Config) -> anyhow::Result<Self> {
            let store = Arc::new(InMemoryStore::new());
            let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let publisher = Arc::new(
                RedisPublisher::new(&config.redis_url, config.event_channel_capacity).await?,
            );

            Ok(Self::build(store, cache, publisher, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;

    use crate::cache::memory::{MemoryCache, MemoryPublisher};
    use crate::storage::SqliteStore;

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache.
        pub async fn new(config: &Config) -> anyhow::Result<Self> {
            let store = Arc::new(SqliteStore::new(&config.sqlite_path).await?);
            let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let publisher = Arc::new(MemoryPublisher::new(config.event_channel_capacity));

            Ok(Self::build(store, cache, publisher, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;

    use crate::cache::redis_impl::{RedisCache, RedisPublisher};
    use crate::storage::SqliteStore;

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache.
        pub async fn new(config: &Config) -> anyhow::Result<Self> {
            let store = Arc::new(SqliteStore::new(&config.sqlite_path).await?);
            let cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let publisher = Arc::new(
                RedisPublisher::new(&config.redis_url, config.event_channel_capacity).await?,
            );

            Ok(Self::build(store, cache, publisher, config))
        }
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================
