//! Redis pub/sub publisher.
//!
//! Each event goes to `events:<topic>` as JSON. Subscribers share one
//! pattern subscription that forwards into a local broadcast channel.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;
use tokio::sync::{broadcast, Mutex};

use repotrack_core::cache::{event_channel, topic_from_channel, EVENT_CHANNEL_PATTERN};
use repotrack_core::events::{DomainEvent, EventPublisher, EventSubscriber, PublishError, Result};

use super::error::map_redis_publish_error;

pub struct RedisPublisher {
    client: redis::Client,
    capacity: usize,
    forwarder: Arc<Mutex<Option<broadcast::Sender<DomainEvent>>>>,
}

impl RedisPublisher {
    /// Creates a new Redis publisher.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::ConnectionFailed` if Redis cannot be reached.
    pub async fn new(url: &str, capacity: usize) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_publish_error)?;

        let _ = client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_publish_error)?;

        Ok(Self {
            client,
            capacity: capacity.max(1),
            forwarder: Arc::new(Mutex::new(None)),
        })
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, event: &DomainEvent) -> Result<()> {
        let channel = event_channel(&event.topic);
        let payload =
            serde_json::to_string(event).map_err(|e| PublishError::Serialization(e.to_string()))?;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_publish_error)?;

        conn.publish::<_, _, ()>(&channel, &payload)
            .await
            .map_err(map_redis_publish_error)?;

        Ok(())
    }
}

#[async_trait]
impl EventSubscriber for RedisPublisher {
    async fn subscribe(&self) -> Result<broadcast::Receiver<DomainEvent>> {
        let mut forwarder = self.forwarder.lock().await;
        if let Some(sender) = forwarder.as_ref() {
            return Ok(sender.subscribe());
        }

        let (tx, rx) = broadcast::channel(self.capacity);
        *forwarder = Some(tx.clone());
        drop(forwarder);

        let client = self.client.clone();
        let slot = Arc::clone(&self.forwarder);
        tokio::spawn(async move {
            if let Err(e) = run_subscription_loop(client, tx).await {
                tracing::error!(error = %e, "Redis event subscription failed");
            }
            // Let the next subscriber start a fresh loop.
            slot.lock().await.take();
        });

        Ok(rx)
    }
}

/// Forwards every `events:*` message to the broadcast channel until the stream ends.
async fn run_subscription_loop(
    client: redis::Client,
    tx: broadcast::Sender<DomainEvent>,
) -> Result<()> {
    let mut pubsub = client
        .get_async_pubsub()
        .await
        .map_err(map_redis_publish_error)?;

    pubsub
        .psubscribe(EVENT_CHANNEL_PATTERN)
        .await
        .map_err(map_redis_publish_error)?;

    let mut stream = pubsub.on_message();

    while let Some(msg) = stream.next().await {
        let channel = msg.get_channel_name().to_string();
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%channel, error = %e, "Unreadable event payload");
                continue;
            }
        };

        match serde_json::from_str::<DomainEvent>(&payload) {
            Ok(event) if topic_from_channel(&channel) == Some(event.topic.as_str()) => {
                let _ = tx.send(event);
            }
            Ok(event) => {
                tracing::warn!(%channel, topic = %event.topic, "Event topic does not match channel");
            }
            Err(e) => {
                tracing::warn!(%channel, error = %e, %payload, "Failed to deserialize domain event");
            }
        }
    }

    tracing::info!("Redis event subscription stream ended");
    Ok(())
}
