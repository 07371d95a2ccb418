//! Redis subscriptions for local topics
//!
//! Subscribe and unsubscribe commands go out under one gate, and each is
//! checked against the connection manager at that moment. A reconnect racing
//! the cleanup of the previous socket therefore cannot leave its user or chat
//! channel unsubscribed.

use crate::connection::{ConnectionManager, Removal};
use async_trait::async_trait;
use chat_cache::{PubSubChannel, Subscriber, SubscriberResult};
use chat_core::Snowflake;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Sink for Redis channel membership commands
#[async_trait]
pub trait ChannelSubscriber: Send + Sync {
    async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()>;
    async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()>;
}

#[async_trait]
impl ChannelSubscriber for Subscriber {
    async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        Subscriber::subscribe(self, channels).await
    }

    async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        Subscriber::unsubscribe(self, channels).await
    }
}

/// Keeps the Redis subscription set in line with the local topic set
pub struct TopicSubscriptions {
    connection_manager: Arc<ConnectionManager>,
    subscriber: Arc<dyn ChannelSubscriber>,
    gate: Mutex<()>,
}

impl TopicSubscriptions {
    pub fn new(
        connection_manager: Arc<ConnectionManager>,
        subscriber: Arc<dyn ChannelSubscriber>,
    ) -> Self {
        Self {
            connection_manager,
            subscriber,
            gate: Mutex::new(()),
        }
    }

    /// Subscribe `user:<id>` if the user still has a local connection
    pub async fn subscribe_user(&self, user_id: Snowflake) -> SubscriberResult<()> {
        let _gate = self.gate.lock().await;
        if !self.connection_manager.has_user(user_id) {
            return Ok(());
        }
        self.subscriber.subscribe(&[PubSubChannel::user(user_id)]).await
    }

    /// Subscribe `chat:<id>` if the chat still has a local listener
    pub async fn subscribe_chat(&self, chat_id: Snowflake) -> SubscriberResult<()> {
        let _gate = self.gate.lock().await;
        if !self.connection_manager.has_chat_listeners(chat_id) {
            return Ok(());
        }
        self.subscriber.subscribe(&[PubSubChannel::chat(chat_id)]).await
    }

    /// Unsubscribe the topics a removal vacated, skipping any re-joined since
    pub async fn release(&self, removal: &Removal) {
        let _gate = self.gate.lock().await;

        let mut channels: Vec<PubSubChannel> = removal
            .vacated_chats
            .iter()
            .filter(|chat_id| !self.connection_manager.has_chat_listeners(**chat_id))
            .map(|chat_id| PubSubChannel::chat(*chat_id))
            .collect();

        if let (Some(user_id), true) = (removal.user_id, removal.user_vacated) {
            if !self.connection_manager.has_user(user_id) {
                channels.push(PubSubChannel::user(user_id));
            }
        }

        if channels.is_empty() {
            return;
        }

        if let Err(e) = self.subscriber.unsubscribe(&channels).await {
            tracing::warn!(error = %e, count = channels.len(), "Failed to unsubscribe channels");
        }
    }
}
