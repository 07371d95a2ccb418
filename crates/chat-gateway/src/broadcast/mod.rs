//! Event broadcasting
//!
//! Handles distribution of events from Redis Pub/Sub to WebSocket connections.

mod dispatcher;
mod topics;

pub use dispatcher::{EventDispatcher, EventDispatcherConfig};
pub use topics::{ChannelSubscriber, TopicSubscriptions};
