//! In-memory store implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use repotrack_core::domain::{Repository, RepositoryDraft, User, UserDraft};
use repotrack_core::storage::{RepositoryStore, Result, StoreError, StoreHealth, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<u64, User>,
    repositories: BTreeMap<u64, Repository>,
    last_user_id: u64,
    last_repository_id: u64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn require_owner(&self, user_id: u64) -> Result<()> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::InvalidData(format!(
                "owner user {user_id} does not exist"
            )))
        }
    }

    /// Joins the current owner row onto a repository.
    fn with_owner(&self, repository: &Repository) -> Repository {
        let mut repository = repository.clone();
        repository.owner = repository
            .user_id
            .and_then(|id| self.users.get(&id))
            .cloned();
        repository
    }
}

/// In-memory store backend.
///
/// Ids are assigned from per-table counters starting at 1 and are never
/// reused. Lists come back ordered by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn get_all_users(&self) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().cloned().collect())
    }

    async fn get_user(&self, id: u64) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&draft.email, None) {
            return Err(StoreError::already_exists("User", &draft.email));
        }

        tables.last_user_id += 1;
        let user = User::new(tables.last_user_id, &draft.name, &draft.email);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, id: u64, draft: &UserDraft) -> Result<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&id) {
            return Err(StoreError::not_found("User", id));
        }
        if tables.email_taken(&draft.email, Some(id)) {
            return Err(StoreError::already_exists("User", &draft.email));
        }

        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("User", id))?;
        user.name = draft.name.clone();
        user.email = draft.email.clone();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: u64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(StoreError::not_found("User", id));
        }

        for repository in tables.repositories.values_mut() {
            if repository.user_id == Some(id) {
                repository.user_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryStore for InMemoryStore {
    async fn get_all_repositories(&self) -> Result<Vec<Repository>> {
        let tables = self.tables.read().await;
        Ok(tables
            .repositories
            .values()
            .map(|r| tables.with_owner(r))
            .collect())
    }

    async fn get_repository(&self, id: u64) -> Result<Option<Repository>> {
        let tables = self.tables.read().await;
        Ok(tables.repositories.get(&id).map(|r| tables.with_owner(r)))
    }

    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<Repository> {
        let mut tables = self.tables.write().await;
        tables.require_owner(draft.user_id)?;

        tables.last_repository_id += 1;
        let repository = Repository::new(
            tables.last_repository_id,
            &draft.name,
            draft.user_id,
            &draft.url,
        )
        .with_ai_enabled(draft.ai_enabled);
        tables.repositories.insert(repository.id, repository.clone());
        Ok(tables.with_owner(&repository))
    }

    async fn update_repository(&self, id: u64, draft: &RepositoryDraft) -> Result<Repository> {
        let mut tables = self.tables.write().await;
        if !tables.repositories.contains_key(&id) {
            return Err(StoreError::not_found("Repository", id));
        }
        tables.require_owner(draft.user_id)?;

        let repository = tables
            .repositories
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("Repository", id))?;
        repository.name = draft.name.clone();
        repository.user_id = Some(draft.user_id);
        repository.url = draft.url.clone();
        repository.ai_enabled = draft.ai_enabled;
        repository.updated_at = Utc::now();
        let repository = repository.clone();
        Ok(tables.with_owner(&repository))
    }

    async fn delete_repository(&self, id: u64) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.repositories.remove(&id).is_none() {
            return Err(StoreError::not_found("Repository", id));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ann() -> UserDraft {
        UserDraft::new("Ann Lee", "ann@example.com")
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = InMemoryStore::new();

        let first = store.create_user(&ann()).await.unwrap();
        let second = store
            .create_user(&UserDraft::new("Bob Ray", "bob@example.com"))
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.get_user(1).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.create_user(&ann()).await.unwrap();

        let result = store.create_user(&ann()).await;

        assert_eq!(
            result,
            Err(StoreError::already_exists("User", "ann@example.com"))
        );
    }

    #[tokio::test]
    async fn test_update_user_keeps_own_email() {
        let store = InMemoryStore::new();
        let user = store.create_user(&ann()).await.unwrap();

        let updated = store
            .update_user(user.id, &UserDraft::new("Ann Smith", "ann@example.com"))
            .await
            .unwrap();

        assert_eq!(updated.name, "Ann Smith");
        assert_eq!(updated.created_at, user.created_at);
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_email() {
        let store = InMemoryStore::new();
        store.create_user(&ann()).await.unwrap();
        let bob = store
            .create_user(&UserDraft::new("Bob Ray", "bob@example.com"))
            .await
            .unwrap();

        let result = store.update_user(bob.id, &ann()).await;

        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let store = InMemoryStore::new();
        let result = store.update_user(9, &ann()).await;
        assert_eq!(result, Err(StoreError::not_found("User", 9)));
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let store = InMemoryStore::new();
        let user = store.create_user(&ann()).await.unwrap();

        store.delete_user(user.id).await.unwrap();
        let result = store.delete_user(user.id).await;

        assert_eq!(result, Err(StoreError::not_found("User", user.id)));
    }

    #[tokio::test]
    async fn test_repository_joins_owner() {
        let store = InMemoryStore::new();
        let owner = store.create_user(&ann()).await.unwrap();

        let created = store
            .create_repository(&RepositoryDraft::new("tracker", owner.id, "https://a.com"))
            .await
            .unwrap();

        assert_eq!(created.owner, Some(owner.clone()));
        let fetched = store.get_repository(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.owner, Some(owner));
    }

    #[tokio::test]
    async fn test_repository_requires_existing_owner() {
        let store = InMemoryStore::new();

        let result = store
            .create_repository(&RepositoryDraft::new("tracker", 42, "https://a.com"))
            .await;

        assert!(matches!(result, Err(StoreError::InvalidData(_))));
        assert!(store.get_all_repositories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_owner_clears_reference() {
        let store = InMemoryStore::new();
        let owner = store.create_user(&ann()).await.unwrap();
        let repo = store
            .create_repository(&RepositoryDraft::new("tracker", owner.id, "https://a.com"))
            .await
            .unwrap();

        store.delete_user(owner.id).await.unwrap();

        let orphan = store.get_repository(repo.id).await.unwrap().unwrap();
        assert_eq!(orphan.user_id, None);
        assert_eq!(orphan.owner, None);
    }

    #[tokio::test]
    async fn test_update_repository_replaces_fields() {
        let store = InMemoryStore::new();
        let owner = store.create_user(&ann()).await.unwrap();
        let repo = store
            .create_repository(&RepositoryDraft::new("tracker", owner.id, "https://a.com"))
            .await
            .unwrap();

        let draft =
            RepositoryDraft::new("tracker-2", owner.id, "https://b.com").with_ai_enabled(true);
        let updated = store.update_repository(repo.id, &draft).await.unwrap();

        assert_eq!(updated.name, "tracker-2");
        assert_eq!(updated.url, "https://b.com");
        assert!(updated.ai_enabled);
        assert_eq!(updated.owner, Some(owner));
    }

    #[tokio::test]
    async fn test_lists_are_ordered_by_id() {
        let store = InMemoryStore::new();
        for (name, email) in [("Cat Ng", "c@example.com"), ("Dan Oh", "d@example.com")] {
            store
                .create_user(&UserDraft::new(name, email))
                .await
                .unwrap();
        }

        let ids: Vec<u64> = store
            .get_all_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
