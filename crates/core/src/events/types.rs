use std::fmt;

use serde::{Deserialize, Serialize};

use super::{PublishError, Result};

/// Entity collections that emit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Repository,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::User => write!(f, "user"),
            EntityKind::Repository => write!(f, "repository"),
        }
    }
}

/// The kind of state change an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Created => write!(f, "created"),
            ChangeKind::Updated => write!(f, "updated"),
            ChangeKind::Deleted => write!(f, "deleted"),
        }
    }
}

/// Returns the topic name for a change, e.g. `repository_updated`.
pub fn topic_name(entity: EntityKind, change: ChangeKind) -> String {
    format!("{entity}_{change}")
}

/// A state change announced after a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    /// `<entity>_created`, `<entity>_updated` or `<entity>_deleted`.
    pub topic: String,
    /// Id of the changed entity, used as the message key.
    pub key: String,
    /// Full entity for create/update, `{"id": ..}` for delete.
    pub payload: serde_json::Value,
}

impl DomainEvent {
    /// Event carrying the full entity after a create.
    pub fn created<T: Serialize>(entity: EntityKind, id: u64, body: &T) -> Result<Self> {
        Self::with_body(entity, ChangeKind::Created, id, body)
    }

    /// Event carrying the full entity after an update.
    pub fn updated<T: Serialize>(entity: EntityKind, id: u64, body: &T) -> Result<Self> {
        Self::with_body(entity, ChangeKind::Updated, id, body)
    }

    /// Event carrying only the id of a deleted entity.
    pub fn deleted(entity: EntityKind, id: u64) -> Self {
        Self {
            topic: topic_name(entity, ChangeKind::Deleted),
            key: id.to_string(),
            payload: serde_json::json!({ "id": id }),
        }
    }

    fn with_body<T: Serialize>(
        entity: EntityKind,
        change: ChangeKind,
        id: u64,
        body: &T,
    ) -> Result<Self> {
        let payload =
            serde_json::to_value(body).map_err(|e| PublishError::Serialization(e.to_string()))?;
        Ok(Self {
            topic: topic_name(entity, change),
            key: id.to_string(),
            payload,
        })
    }
}
