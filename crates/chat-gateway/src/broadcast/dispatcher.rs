//! Event dispatcher
//!
//! Receives events from Redis Pub/Sub and dispatches them to WebSocket connections.

use super::topics::TopicSubscriptions;
use crate::connection::{ConnectionManager, Removal};
use chat_cache::{PubSubChannel, ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberResult};
use chat_core::Snowflake;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Configuration for the event dispatcher
#[derive(Debug, Clone)]
pub struct EventDispatcherConfig {
    pub redis_url: String,
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for EventDispatcherConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Routes Redis Pub/Sub messages to local WebSocket connections.
///
/// The Redis subscription set mirrors the local topic set: a user channel is
/// subscribed while the user has a connection here, a chat channel while at
/// least one local connection listens to the chat.
pub struct EventDispatcher {
    connection_manager: Arc<ConnectionManager>,
    subscriber: Arc<Subscriber>,
    topics: TopicSubscriptions,
    running: AtomicBool,
}

impl EventDispatcher {
    #[must_use]
    pub fn new(config: EventDispatcherConfig, connection_manager: Arc<ConnectionManager>) -> Self {
        let subscriber = Arc::new(
            SubscriberBuilder::new()
                .redis_url(&config.redis_url)
                .broadcast_buffer(config.broadcast_buffer)
                .reconnect_delay_ms(config.reconnect_delay_ms)
                .build(),
        );
        let topics = TopicSubscriptions::new(connection_manager.clone(), subscriber.clone());

        Self {
            connection_manager,
            subscriber,
            topics,
            running: AtomicBool::new(false),
        }
    }

    pub async fn subscribe_user(&self, user_id: Snowflake) -> SubscriberResult<()> {
        self.topics.subscribe_user(user_id).await
    }

    pub async fn subscribe_chat(&self, chat_id: Snowflake) -> SubscriberResult<()> {
        self.topics.subscribe_chat(chat_id).await
    }

    /// Drop the Redis subscriptions a removed connection no longer needs
    pub async fn release(&self, removal: &Removal) {
        self.topics.release(removal).await;
    }

    /// Spawn the background loop that forwards received events
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Event dispatcher is already running");
            return;
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            dispatcher.run().await;
        });

        tracing::info!("Event dispatcher started");
    }

    async fn run(&self) {
        let mut receiver = self.subscriber.receiver();

        loop {
            match receiver.recv().await {
                Ok(msg) => self.handle_message(&msg),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "Event dispatcher lagged behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Event dispatcher channel closed");
                    break;
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Event dispatcher loop ended");
    }

    fn handle_message(&self, msg: &ReceivedMessage) {
        let Some(event) = &msg.event else {
            tracing::debug!(channel = %msg.channel, "Received non-event message, ignoring");
            return;
        };

        let event_type = event.event_type.as_str();
        let data = &event.data;

        let sent = match &msg.channel {
            PubSubChannel::Chat(chat_id) => {
                self.connection_manager.send_to_chat(*chat_id, event_type, data)
            }
            PubSubChannel::User(user_id) => {
                self.connection_manager.send_to_user(*user_id, event_type, data)
            }
        };

        tracing::trace!(channel = %msg.channel, event_type, sent, "Event dispatched");
    }
}
