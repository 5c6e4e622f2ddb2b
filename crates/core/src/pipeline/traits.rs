use async_trait::async_trait;

use crate::domain::{Repository, RepositoryDraft, User, UserDraft};

use super::Result;

/// Read and mutation pipelines for users.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn get_user(&self, id: u64) -> Result<Option<User>>;

    async fn create_user(&self, draft: &UserDraft) -> Result<User>;

    async fn update_user(&self, id: u64, draft: &UserDraft) -> Result<User>;

    async fn delete_user(&self, id: u64) -> Result<()>;
}

/// Read and mutation pipelines for repositories.
#[async_trait]
pub trait RepositoryService: Send + Sync {
    async fn list_repositories(&self) -> Result<Vec<Repository>>;

    async fn get_repository(&self, id: u64) -> Result<Option<Repository>>;

    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<Repository>;

    async fn update_repository(&self, id: u64, draft: &RepositoryDraft) -> Result<Repository>;

    async fn delete_repository(&self, id: u64) -> Result<()>;
}
