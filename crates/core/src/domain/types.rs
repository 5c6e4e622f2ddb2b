use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a user with the given identity, stamped with the current time.
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the update timestamp (useful for testing).
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}

/// A source code repository owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    /// Owning user. Becomes `None` when the owner is deleted.
    pub user_id: Option<u64>,
    /// Snapshot of the owning user as read together with the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<User>,
    pub url: String,
    pub ai_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Repository {
    /// Creates a repository owned by `user_id`, stamped with the current time.
    pub fn new(id: u64, name: impl Into<String>, user_id: u64, url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            user_id: Some(user_id),
            owner: None,
            url: url.into(),
            ai_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the owner snapshot.
    pub fn with_owner(mut self, owner: User) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Sets the AI flag.
    pub fn with_ai_enabled(mut self, ai_enabled: bool) -> Self {
        self.ai_enabled = ai_enabled;
        self
    }

    /// Sets the creation timestamp (useful for testing).
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Sets the update timestamp (useful for testing).
    pub fn with_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = updated_at;
        self
    }
}
