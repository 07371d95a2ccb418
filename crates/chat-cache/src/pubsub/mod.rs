//! Redis Pub/Sub module.
//!
//! Cross-instance distribution of chat and user events.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{PubSubChannel, CHAT_CHANNEL_PREFIX, USER_CHANNEL_PREFIX};
pub use publisher::{event_types, EventPublisher, PubSubEvent, Publisher};
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
