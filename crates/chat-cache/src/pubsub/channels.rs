//! Pub/Sub channel definitions.
//!
//! Channel naming conventions for cross-instance fan-out over Redis.

use chat_core::Snowflake;

/// Channel prefix for per-chat events (both participants)
pub const CHAT_CHANNEL_PREFIX: &str = "chat:";
/// Channel prefix for user-specific events
pub const USER_CHANNEL_PREFIX: &str = "user:";

/// Pub/Sub channel types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PubSubChannel {
    /// Events for one chat
    Chat(Snowflake),
    /// Events for one user
    User(Snowflake),
}

impl PubSubChannel {
    #[must_use]
    pub fn chat(chat_id: Snowflake) -> Self {
        Self::Chat(chat_id)
    }

    #[must_use]
    pub fn user(user_id: Snowflake) -> Self {
        Self::User(user_id)
    }

    /// Get the Redis channel name
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Chat(id) => format!("{CHAT_CHANNEL_PREFIX}{id}"),
            Self::User(id) => format!("{USER_CHANNEL_PREFIX}{id}"),
        }
    }

    /// Parse a channel name back to a `PubSubChannel`; `None` for foreign names
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let prefixed = [
            (CHAT_CHANNEL_PREFIX, Self::Chat as fn(Snowflake) -> Self),
            (USER_CHANNEL_PREFIX, Self::User),
        ];
        for (prefix, build) in prefixed {
            if let Some(id) = name.strip_prefix(prefix).and_then(|s| Snowflake::parse(s).ok()) {
                return Some(build(id));
            }
        }

        None
    }
}

impl std::fmt::Display for PubSubChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
