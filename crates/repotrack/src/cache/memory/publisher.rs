//! In-process event publisher.
//!
//! Fans domain events out to local subscribers over a tokio broadcast channel.

use async_trait::async_trait;
use tokio::sync::broadcast;

use repotrack_core::events::{DomainEvent, EventPublisher, EventSubscriber, Result};

/// Default channel capacity for published events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct MemoryPublisher {
    sender: broadcast::Sender<DomainEvent>,
}

impl MemoryPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl EventPublisher for MemoryPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<()> {
        // No subscribers is fine, the event is simply dropped.
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        tracing::trace!(topic = %event.topic, receivers, "Event published");
        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for MemoryPublisher {
    async fn subscribe(&self) -> Result<broadcast::Receiver<DomainEvent>> {
        Ok(self.sender.subscribe())
    }
}
