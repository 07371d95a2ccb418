//! # chat-cache
//!
//! Redis plumbing and in-process presence for the chat subsystem.
//!
//! - **Connection Pool**: deadpool-managed Redis connections
//! - **Pub/Sub**: per-chat and per-user event fan-out across gateway instances
//! - **Presence**: registry of the single live session per user
//! - **Stats**: online-count snapshots

pub mod pool;
pub mod presence;
pub mod pubsub;
pub mod stats;

pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

pub use presence::{DeliveryError, PresenceRegistry, SessionHandle, SharedPresenceRegistry};

pub use pubsub::{
    event_types, EventPublisher, PubSubChannel, PubSubEvent, Publisher, ReceivedMessage,
    Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberResult,
    CHAT_CHANNEL_PREFIX, USER_CHANNEL_PREFIX,
};

pub use stats::{OnlineSnapshot, OnlineStatsStore};
