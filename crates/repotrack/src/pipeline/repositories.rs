//! Repository pipelines.
//!
//! Cached repositories embed their owner snapshot. A user update does not
//! touch repository keys, so a snapshot can lag until its TTL runs out.

use std::sync::Arc;

use async_trait::async_trait;

use repotrack_core::cache::{repository_key, REPOSITORIES_ALL_KEY};
use repotrack_core::domain::{validate_repository, Repository, RepositoryDraft};
use repotrack_core::events::{DomainEvent, EntityKind};
use repotrack_core::pipeline::{RepositoryService, Result};
use repotrack_core::storage::RepositoryStore;

use super::PipelineDeps;

pub struct RepositoryPipeline<S: RepositoryStore> {
    store: Arc<S>,
    deps: PipelineDeps,
}

impl<S: RepositoryStore> RepositoryPipeline<S> {
    pub fn new(store: Arc<S>, deps: PipelineDeps) -> Self {
        Self { store, deps }
    }

    async fn invalidate(&self, id: u64) {
        let key = repository_key(id);
        self.deps
            .cache
            .invalidate(&[key.as_str(), REPOSITORIES_ALL_KEY])
            .await;
    }
}

#[async_trait]
impl<S: RepositoryStore + 'static> RepositoryService for RepositoryPipeline<S> {
    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let repositories = self
            .deps
            .read_through(REPOSITORIES_ALL_KEY, || async {
                self.store.get_all_repositories().await.map(Some)
            })
            .await?;
        Ok(repositories.unwrap_or_default())
    }

    async fn get_repository(&self, id: u64) -> Result<Option<Repository>> {
        self.deps
            .read_through(&repository_key(id), || self.store.get_repository(id))
            .await
    }

    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<Repository> {
        let draft = draft.normalized();
        validate_repository(&draft)?;

        let repository = self
            .deps
            .guarded(|| self.store.create_repository(&draft))
            .await?;

        self.invalidate(repository.id).await;
        self.deps
            .events
            .emit(DomainEvent::created(
                EntityKind::Repository,
                repository.id,
                &repository,
            ))
            .await;

        tracing::info!(
            repository_id = repository.id,
            user_id = ?repository.user_id,
            "Repository created"
        );
        Ok(repository)
    }

    async fn update_repository(&self, id: u64, draft: &RepositoryDraft) -> Result<Repository> {
        let draft = draft.normalized();
        validate_repository(&draft)?;

        let repository = self
            .deps
            .guarded(|| self.store.update_repository(id, &draft))
            .await?;

        self.invalidate(id).await;
        self.deps
            .events
            .emit(DomainEvent::updated(EntityKind::Repository, id, &repository))
            .await;

        tracing::info!(repository_id = id, "Repository updated");
        Ok(repository)
    }

    async fn delete_repository(&self, id: u64) -> Result<()> {
        self.deps
            .guarded(|| self.store.delete_repository(id))
            .await?;

        self.invalidate(id).await;
        self.deps
            .events
            .emit(Ok(DomainEvent::deleted(EntityKind::Repository, id)))
            .await;

        tracing::info!(repository_id = id, "Repository deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use repotrack_core::cache::Cache;
    use repotrack_core::domain::{User, ValidationReason};
    use repotrack_core::pipeline::PipelineError;
    use repotrack_core::storage::StoreError;

    use crate::cache::memory::MemoryCache;
    use crate::pipeline::test_deps;
    use crate::pipeline::test_support::{FlakyStore, RecordingPublisher};

    struct Harness {
        pipeline: RepositoryPipeline<FlakyStore>,
        store: Arc<FlakyStore>,
        cache: Arc<MemoryCache>,
        publisher: Arc<RecordingPublisher>,
        owner: User,
    }

    async fn harness() -> Harness {
        let store = Arc::new(FlakyStore::new());
        let owner = store.seed_user("Ann Lee", "ann@example.com").await;
        let cache = Arc::new(MemoryCache::new(100));
        let publisher = Arc::new(RecordingPublisher::new());
        let pipeline =
            RepositoryPipeline::new(store.clone(), test_deps(cache.clone(), publisher.clone()));
        Harness {
            pipeline,
            store,
            cache,
            publisher,
            owner,
        }
    }

    #[tokio::test]
    async fn test_zero_owner_is_rejected_before_store() {
        let h = harness().await;

        let result = h
            .pipeline
            .create_repository(&RepositoryDraft::new("x", 0, "http://a.com"))
            .await;

        match result {
            Err(PipelineError::Validation(err)) => {
                assert_eq!(err.field, "user_id");
                assert_eq!(err.reason, ValidationReason::MissingReference);
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
        assert_eq!(h.store.calls(), 0);
        assert_eq!(h.publisher.attempts(), 0);
    }

    #[tokio::test]
    async fn test_relative_url_is_rejected() {
        let h = harness().await;

        let result = h
            .pipeline
            .create_repository(&RepositoryDraft::new("tracker", h.owner.id, "/tracker"))
            .await;

        assert!(matches!(result, Err(PipelineError::Validation(e)) if e.field == "url"));
        assert_eq!(h.store.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_returns_owner_snapshot_and_emits() {
        let h = harness().await;

        let repo = h
            .pipeline
            .create_repository(
                &RepositoryDraft::new("tracker", h.owner.id, "https://a.com").with_ai_enabled(true),
            )
            .await
            .unwrap();

        assert_eq!(repo.owner.as_ref(), Some(&h.owner));
        assert!(repo.ai_enabled);
        let events = h.publisher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic, "repository_created");
        assert_eq!(events[0].payload["owner"]["email"], "ann@example.com");
    }

    #[tokio::test]
    async fn test_missing_owner_is_store_invalid_data() {
        let h = harness().await;

        let result = h
            .pipeline
            .create_repository(&RepositoryDraft::new("tracker", 77, "https://a.com"))
            .await;

        assert!(matches!(
            result,
            Err(PipelineError::Store(StoreError::InvalidData(_)))
        ));
        assert_eq!(h.publisher.attempts(), 0);
    }

    #[tokio::test]
    async fn test_corrupted_entry_is_refetched_and_repopulated() {
        let h = harness().await;
        let repo = h
            .pipeline
            .create_repository(&RepositoryDraft::new("tracker", h.owner.id, "https://a.com"))
            .await
            .unwrap();
        let key = repository_key(repo.id);
        h.cache.set(&key, b"\x00garbage", None).await.unwrap();
        let calls_before = h.store.calls();

        let fetched = h.pipeline.get_repository(repo.id).await.unwrap();

        assert_eq!(fetched, Some(repo.clone()));
        assert_eq!(h.store.calls(), calls_before + 1);
        let cached = h.cache.get(&key).await.unwrap().unwrap();
        let decoded: Repository = serde_json::from_slice(&cached).unwrap();
        assert_eq!(decoded, repo);
    }

    #[tokio::test]
    async fn test_update_invalidates_and_emits() {
        let h = harness().await;
        let repo = h
            .pipeline
            .create_repository(&RepositoryDraft::new("tracker", h.owner.id, "https://a.com"))
            .await
            .unwrap();
        h.pipeline.get_repository(repo.id).await.unwrap();
        h.pipeline.list_repositories().await.unwrap();

        let updated = h
            .pipeline
            .update_repository(
                repo.id,
                &RepositoryDraft::new("tracker-2", h.owner.id, "https://b.com"),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "tracker-2");
        assert!(h.cache.get(&repository_key(repo.id)).await.unwrap().is_none());
        assert!(h.cache.get(REPOSITORIES_ALL_KEY).await.unwrap().is_none());
        assert_eq!(
            h.publisher.topics(),
            vec!["repository_created", "repository_updated"]
        );
    }

    #[tokio::test]
    async fn test_update_missing_repository_is_not_found() {
        let h = harness().await;

        let result = h
            .pipeline
            .update_repository(5, &RepositoryDraft::new("tracker", h.owner.id, "https://a.com"))
            .await;

        assert_eq!(
            result,
            Err(PipelineError::Store(StoreError::not_found("Repository", 5)))
        );
        assert_eq!(h.publisher.attempts(), 0);
    }

    #[tokio::test]
    async fn test_delete_emits_id_only() {
        let h = harness().await;
        let repo = h
            .pipeline
            .create_repository(&RepositoryDraft::new("tracker", h.owner.id, "https://a.com"))
            .await
            .unwrap();

        h.pipeline.delete_repository(repo.id).await.unwrap();

        assert_eq!(h.pipeline.get_repository(repo.id).await.unwrap(), None);
        let events = h.publisher.events();
        assert_eq!(events[1].topic, "repository_deleted");
        assert_eq!(events[1].payload, serde_json::json!({ "id": repo.id }));
    }

    #[tokio::test]
    async fn test_list_is_cached() {
        let h = harness().await;
        h.pipeline
            .create_repository(&RepositoryDraft::new("tracker", h.owner.id, "https://a.com"))
            .await
            .unwrap();
        let calls_before = h.store.calls();

        let first = h.pipeline.list_repositories().await.unwrap();
        let second = h.pipeline.list_repositories().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
        assert_eq!(h.store.calls(), calls_before + 1);
    }
}
