use async_trait::async_trait;

use crate::domain::{Repository, RepositoryDraft, User, UserDraft};

use super::Result;

/// Store gateway for users.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Gets every user.
    async fn get_all_users(&self) -> Result<Vec<User>>;

    /// Gets a user by id.
    async fn get_user(&self, id: u64) -> Result<Option<User>>;

    /// Creates a user, returning it with its assigned id and timestamps.
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create_user(&self, draft: &UserDraft) -> Result<User>;

    /// Replaces name and email of an existing user.
    ///
    /// Fails with `NotFound` when no user has this id.
    async fn update_user(&self, id: u64, draft: &UserDraft) -> Result<User>;

    /// Deletes a user. Owned repositories survive with their owner cleared.
    ///
    /// Fails with `NotFound` when no user has this id.
    async fn delete_user(&self, id: u64) -> Result<()>;
}

/// Store gateway for repositories.
#[async_trait]
pub trait RepositoryStore: Send + Sync {
    /// Gets every repository, each with its owner snapshot.
    async fn get_all_repositories(&self) -> Result<Vec<Repository>>;

    /// Gets a repository by id, with its owner snapshot.
    async fn get_repository(&self, id: u64) -> Result<Option<Repository>>;

    /// Creates a repository.
    ///
    /// Fails with `InvalidData` when the owner does not exist.
    async fn create_repository(&self, draft: &RepositoryDraft) -> Result<Repository>;

    /// Replaces every field of an existing repository.
    async fn update_repository(&self, id: u64, draft: &RepositoryDraft) -> Result<Repository>;

    /// Deletes a repository.
    async fn delete_repository(&self, id: u64) -> Result<()>;
}

/// Liveness check for the relational store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<()>;
}
