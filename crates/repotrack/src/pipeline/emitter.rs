//! Fire-and-forget event emission.

use std::sync::Arc;
use std::time::Duration;

use repotrack_core::events::{DomainEvent, EventPublisher, PublishError, Result as PublishResult};

/// Hands domain events to the publisher after a committed mutation.
///
/// Emission is at most once: a failed or slow publish is logged and dropped,
/// it never fails or rolls back the mutation.
#[derive(Clone)]
pub struct EventEmitter {
    publisher: Arc<dyn EventPublisher>,
    timeout: Duration,
}

impl EventEmitter {
    pub fn new(publisher: Arc<dyn EventPublisher>, timeout: Duration) -> Self {
        Self { publisher, timeout }
    }

    /// Publishes an event, or logs why it could not be built or sent.
    pub async fn emit(&self, event: PublishResult<DomainEvent>) {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to build domain event");
                return;
            }
        };

        let result = tokio::time::timeout(self.timeout, self.publisher.publish(&event))
            .await
            .unwrap_or_else(|_| Err(PublishError::Timeout(self.timeout.as_millis() as u64)));

        match result {
            Ok(()) => tracing::debug!(topic = %event.topic, key = %event.key, "Event published"),
            Err(err) => tracing::warn!(
                topic = %event.topic,
                key = %event.key,
                error = %err,
                "Failed to publish event"
            ),
        }
    }
}
