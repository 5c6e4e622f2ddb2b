//! Test doubles shared by the pipeline tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use repotrack_core::cache::{Cache, CacheError, Result as CacheResult};
use repotrack_core::domain::{Repository, RepositoryDraft, User, UserDraft};
use repotrack_core::events::{DomainEvent, EventPublisher, PublishError, Result as PublishResult};
use repotrack_core::storage::{
    RepositoryStore, Result as StoreResult, StoreError, StoreHealth, UserStore,
};

use crate::storage::inmemory::InMemoryStore;

/// Cache whose backend is unreachable.
pub struct FailingCache;

#[async_trait]
impl Cache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::ConnectionFailed("refused".to_string()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("refused".to_string()))
    }

    async fn delete(&self, _keys: &[&str]) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("refused".to_string()))
    }

    async fn ping(&self) -> CacheResult<()> {
        Err(CacheError::ConnectionFailed("refused".to_string()))
    }
}

/// Cache that never answers.
pub struct StalledCache;

#[async_trait]
impl Cache for StalledCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        std::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn delete(&self, _keys: &[&str]) -> CacheResult<()> {
        std::future::pending().await
    }

    async fn ping(&self) -> CacheResult<()> {
        std::future::pending().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PublishMode {
    Deliver,
    Fail,
    Stall,
}

/// Publisher that records delivered events.
pub struct RecordingPublisher {
    mode: PublishMode,
    attempts: AtomicUsize,
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingPublisher {
    fn with_mode(mode: PublishMode) -> Self {
        Self {
            mode,
            attempts: AtomicUsize::new(0),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn new() -> Self {
        Self::with_mode(PublishMode::Deliver)
    }

    pub fn failing() -> Self {
        Self::with_mode(PublishMode::Fail)
    }

    pub fn stalled() -> Self {
        Self::with_mode(PublishMode::Stall)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn topics(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.topic).collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: &DomainEvent) -> PublishResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            PublishMode::Deliver => {
                self.events.lock().unwrap().push(event.clone());
                Ok(())
            }
            PublishMode::Fail => Err(PublishError::ConnectionFailed("broker down".to_string())),
            PublishMode::Stall => std::future::pending().await,
        }
    }
}

/// In-memory store that counts calls and can be switched to fail like a dead database.
#[derive(Default)]
pub struct FlakyStore {
    inner: InMemoryStore,
    calls: AtomicUsize,
    down: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Seeds a user without going through the counters.
    pub async fn seed_user(&self, name: &str, email: &str) -> User {
        self.inner
            .create_user(&UserDraft::new(name, email))
            .await
            .unwrap()
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::ConnectionFailed("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn get_all_users(&self) -> StoreResult<Vec<User>> {
        self.enter()?;
        self.inner.get_all_users().await
    }

    async fn get_user(&self, id: u64) -> StoreResult<Option<User>> {
        self.enter()?;
        self.inner.get_user(id).await
    }

    async fn create_user(&self, draft: &UserDraft) -> StoreResult<User> {
        self.enter()?;
        self.inner.create_user(draft).await
    }

    async fn update_user(&self, id: u64, draft: &UserDraft) -> StoreResult<User> {
        self.enter()?;
        self.inner.update_user(id, draft).await
    }

    async fn delete_user(&self, id: u64) -> StoreResult<()> {
        self.enter()?;
        self.inner.delete_user(id).await
    }
}

#[async_trait]
impl RepositoryStore for FlakyStore {
    async fn get_all_repositories(&self) -> StoreResult<Vec<Repository>> {
        self.enter()?;
        self.inner.get_all_repositories().await
    }

    async fn get_repository(&self, id: u64) -> StoreResult<Option<Repository>> {
        self.enter()?;
        self.inner.get_repository(id).await
    }

    async fn create_repository(&self, draft: &RepositoryDraft) -> StoreResult<Repository> {
        self.enter()?;
        self.inner.create_repository(draft).await
    }

    async fn update_repository(
        &self,
        id: u64,
        draft: &RepositoryDraft,
    ) -> StoreResult<Repository> {
        self.enter()?;
        self.inner.update_repository(id, draft).await
    }

    async fn delete_repository(&self, id: u64) -> StoreResult<()> {
        self.enter()?;
        self.inner.delete_repository(id).await
    }
}

#[async_trait]
impl StoreHealth for FlakyStore {
    async fn ping(&self) -> StoreResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(StoreError::ConnectionFailed("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}
