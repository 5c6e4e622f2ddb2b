use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{DomainEvent, Result};

/// Best-effort sink for domain events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Hands one event to the transport. No retries.
    async fn publish(&self, event: &DomainEvent) -> Result<()>;
}

/// Source of published events, for in-process consumers.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Subscribes to every topic.
    async fn subscribe(&self) -> Result<broadcast::Receiver<DomainEvent>>;
}
