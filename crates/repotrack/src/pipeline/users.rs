//! User pipelines.

use std::sync::Arc;

use async_trait::async_trait;

use repotrack_core::cache::{user_key, USERS_ALL_KEY};
use repotrack_core::domain::{validate_user, User, UserDraft};
use repotrack_core::events::{DomainEvent, EntityKind};
use repotrack_core::pipeline::{Result, UserService};
use repotrack_core::storage::UserStore;

use super::PipelineDeps;

pub struct UserPipeline<S: UserStore> {
    store: Arc<S>,
    deps: PipelineDeps,
}

impl<S: UserStore> UserPipeline<S> {
    pub fn new(store: Arc<S>, deps: PipelineDeps) -> Self {
        Self { store, deps }
    }

    async fn invalidate(&self, id: u64) {
        let key = user_key(id);
        self.deps
            .cache
            .invalidate(&[key.as_str(), USERS_ALL_KEY])
            .await;
    }
}

#[async_trait]
impl<S: UserStore + 'static> UserService for UserPipeline<S> {
    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self
            .deps
            .read_through(USERS_ALL_KEY, || async {
                self.store.get_all_users().await.map(Some)
            })
            .await?;
        Ok(users.unwrap_or_default())
    }

    async fn get_user(&self, id: u64) -> Result<Option<User>> {
        self.deps
            .read_through(&user_key(id), || self.store.get_user(id))
            .await
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        let draft = draft.normalized();
        validate_user(&draft)?;

        let user = self
            .deps
            .guarded(|| self.store.create_user(&draft))
            .await?;

        self.invalidate(user.id).await;
        self.deps
            .events
            .emit(DomainEvent::created(EntityKind::User, user.id, &user))
            .await;

        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    async fn update_user(&self, id: u64, draft: &UserDraft) -> Result<User> {
        let draft = draft.normalized();
        validate_user(&draft)?;

        let user = self
            .deps
            .guarded(|| self.store.update_user(id, &draft))
            .await?;

        self.invalidate(id).await;
        self.deps
            .events
            .emit(DomainEvent::updated(EntityKind::User, id, &user))
            .await;

        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    async fn delete_user(&self, id: u64) -> Result<()> {
        self.deps.guarded(|| self.store.delete_user(id)).await?;

        self.invalidate(id).await;
        self.deps
            .events
            .emit(Ok(DomainEvent::deleted(EntityKind::User, id)))
            .await;

        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
