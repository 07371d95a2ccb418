//! Redis Pub/Sub publisher.
//!
//! Publishes events to Redis channels for distribution to gateway sessions.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Event names shared by publishers and the gateway
pub mod event_types {
    /// A message was stored in a chat
    pub const MESSAGE_CREATE: &str = "MESSAGE_CREATE";
    /// Live notification for the receiver of a message
    pub const NOTIFICATION_CREATE: &str = "NOTIFICATION_CREATE";
    /// A participant's view of a chat changed (new message, read state)
    pub const CHAT_SUMMARY_UPDATE: &str = "CHAT_SUMMARY_UPDATE";
}

/// Event wrapper for Pub/Sub messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubEvent {
    /// Event type name (e.g., "MESSAGE_CREATE")
    pub event_type: String,
    /// Event payload
    pub data: serde_json::Value,
}

impl PubSubEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Build an event from any serializable payload
    pub fn from_payload<T: Serialize>(
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(event_type, serde_json::to_value(payload)?))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Outbound event sink.
///
/// Services publish through this trait so they can run against Redis in
/// production and against a recorder in tests.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event; returns how many subscribers received it
    async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32>;
}

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventPublisher for Publisher {
    async fn publish(&self, channel: &PubSubChannel, event: &PubSubEvent) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let channel_name = channel.name();
        let payload = event.to_json()?;

        let receivers: u32 = conn.publish(&channel_name, &payload).await?;

        tracing::debug!(
            channel = %channel_name,
            event_type = %event.event_type,
            receivers,
            "Published event"
        );

        Ok(receivers)
    }
}
