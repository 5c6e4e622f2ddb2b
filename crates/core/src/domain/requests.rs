//! Input payloads for creating and updating entities.
//!
//! Drafts carry only client-supplied fields. The store assigns ids and timestamps.

use serde::{Deserialize, Serialize};

/// Payload for creating or updating a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl UserDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Returns a copy with surrounding whitespace stripped from every text field.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

/// Payload for creating or updating a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDraft {
    #[serde(default)]
    pub name: String,
    /// Owning user. Zero means "not provided".
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub ai_enabled: bool,
}

impl RepositoryDraft {
    pub fn new(name: impl Into<String>, user_id: u64, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            user_id,
            url: url.into(),
            ai_enabled: false,
        }
    }

    pub fn with_ai_enabled(mut self, ai_enabled: bool) -> Self {
        self.ai_enabled = ai_enabled;
        self
    }

    /// Returns a copy with surrounding whitespace stripped from every text field.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            user_id: self.user_id,
            url: self.url.trim().to_string(),
            ai_enabled: self.ai_enabled,
        }
    }
}
