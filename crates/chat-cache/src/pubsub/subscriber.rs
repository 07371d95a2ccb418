//! Redis Pub/Sub subscriber.
//!
//! One connection per gateway process. Channel membership changes are sent to
//! the background listener as commands; received messages fan out through a
//! broadcast channel.

use crate::pubsub::{PubSubChannel, PubSubEvent};
use futures_util::StreamExt;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Channel closed")]
    ChannelClosed,
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Message received from Pub/Sub
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    pub channel: PubSubChannel,
    /// Parsed event, `None` when the payload is not a `PubSubEvent`
    pub event: Option<PubSubEvent>,
    pub payload: String,
}

impl ReceivedMessage {
    fn from_redis(channel_name: &str, payload: String) -> Option<Self> {
        Some(Self {
            channel: PubSubChannel::parse(channel_name)?,
            event: serde_json::from_str(&payload).ok(),
            payload,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub redis_url: String,
    /// Capacity of the broadcast channel handed to receivers
    pub broadcast_buffer: usize,
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

#[derive(Debug)]
enum Command {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

enum Step {
    Message(redis::Msg),
    StreamEnded,
    Command(Option<Command>),
}

/// Redis Pub/Sub subscriber
pub struct Subscriber {
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    control_tx: mpsc::Sender<Command>,
}

impl Subscriber {
    /// Spawn the background listener and return a handle to it
    #[must_use]
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(64);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(listener_loop(
            config,
            subscribed.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            subscribed,
            broadcast_tx,
            control_tx,
        }
    }

    pub async fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        self.send(Command::Subscribe(names(channels))).await
    }

    pub async fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        self.send(Command::Unsubscribe(names(channels))).await
    }

    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.broadcast_tx.subscribe()
    }

    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.send(Command::Shutdown).await
    }

    async fn send(&self, command: Command) -> SubscriberResult<()> {
        self.control_tx
            .send(command)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

fn names(channels: &[PubSubChannel]) -> Vec<String> {
    channels.iter().map(PubSubChannel::name).collect()
}

async fn listener_loop(
    config: SubscriberConfig,
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    mut control_rx: mpsc::Receiver<Command>,
) {
    loop {
        match run_listener(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
            Ok(true) => {
                tracing::info!("Subscriber shutting down");
                break;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::error!(error = %e, "Subscriber error, reconnecting");
                tokio::time::sleep(Duration::from_millis(config.reconnect_delay_ms)).await;
            }
        }
    }
}

/// Returns `Ok(true)` on shutdown, `Ok(false)` when the stream ended
async fn run_listener(
    config: &SubscriberConfig,
    subscribed: &RwLock<HashSet<String>>,
    broadcast_tx: &broadcast::Sender<ReceivedMessage>,
    control_rx: &mut mpsc::Receiver<Command>,
) -> SubscriberResult<bool> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;

    // Restore subscriptions after a reconnect
    let existing: Vec<String> = subscribed.read().await.iter().cloned().collect();
    for channel in &existing {
        pubsub.subscribe(channel).await?;
    }

    tracing::info!(channels = existing.len(), "Subscriber connected to Redis");

    loop {
        // The message stream borrows the connection, so it is rebuilt after
        // every step to let commands reuse it.
        let step = {
            let mut stream = pubsub.on_message();
            tokio::select! {
                msg = stream.next() => match msg {
                    Some(msg) => Step::Message(msg),
                    None => Step::StreamEnded,
                },
                cmd = control_rx.recv() => Step::Command(cmd),
            }
        };

        match step {
            Step::Message(msg) => {
                let channel_name = msg.get_channel_name().to_string();
                let payload: String = msg.get_payload().unwrap_or_default();
                tracing::trace!(channel = %channel_name, "Received Pub/Sub message");
                match ReceivedMessage::from_redis(&channel_name, payload) {
                    // No receivers is not an error
                    Some(received) => {
                        let _ = broadcast_tx.send(received);
                    }
                    None => tracing::debug!(channel = %channel_name, "Ignoring message on unknown channel"),
                }
            }
            Step::StreamEnded => {
                tracing::warn!("Pub/Sub stream ended");
                return Ok(false);
            }
            Step::Command(Some(Command::Subscribe(channels))) => {
                for channel in channels {
                    match pubsub.subscribe(&channel).await {
                        Ok(()) => {
                            tracing::debug!(channel = %channel, "Subscribed");
                            subscribed.write().await.insert(channel);
                        }
                        Err(e) => tracing::error!(channel = %channel, error = %e, "Failed to subscribe"),
                    }
                }
            }
            Step::Command(Some(Command::Unsubscribe(channels))) => {
                for channel in channels {
                    match pubsub.unsubscribe(&channel).await {
                        Ok(()) => {
                            tracing::debug!(channel = %channel, "Unsubscribed");
                            subscribed.write().await.remove(&channel);
                        }
                        Err(e) => {
                            tracing::error!(channel = %channel, error = %e, "Failed to unsubscribe");
                        }
                    }
                }
            }
            Step::Command(Some(Command::Shutdown) | None) => return Ok(true),
        }
    }
}

/// Builder for [`Subscriber`]
#[derive(Debug, Default)]
pub struct SubscriberBuilder {
    config: SubscriberConfig,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    /// Start the subscriber with no channels
    #[must_use]
    pub fn build(self) -> Subscriber {
        Subscriber::spawn(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::Snowflake;

    #[test]
    fn test_received_message_parsing() {
        let payload = r#"{"event_type":"MESSAGE_CREATE","data":{}}"#.to_string();
        let msg = ReceivedMessage::from_redis("chat:12345", payload.clone()).unwrap();

        assert_eq!(msg.channel, PubSubChannel::Chat(Snowflake::new(12345)));
        assert_eq!(msg.event.unwrap().event_type, "MESSAGE_CREATE");
        assert_eq!(msg.payload, payload);
    }

    #[test]
    fn test_received_message_invalid_json() {
        let msg = ReceivedMessage::from_redis("user:123", "invalid".to_string()).unwrap();

        assert_eq!(msg.channel, PubSubChannel::User(Snowflake::new(123)));
        assert!(msg.event.is_none());
    }

    #[test]
    fn test_received_message_unknown_channel() {
        assert!(ReceivedMessage::from_redis("broadcast", "{}".to_string()).is_none());
    }

    #[test]
    fn test_subscriber_builder() {
        let builder = SubscriberBuilder::new()
            .redis_url("redis://localhost:6380")
            .broadcast_buffer(2048)
            .reconnect_delay_ms(500);

        assert_eq!(builder.config.redis_url, "redis://localhost:6380");
        assert_eq!(builder.config.broadcast_buffer, 2048);
        assert_eq!(builder.config.reconnect_delay_ms, 500);
    }
}
