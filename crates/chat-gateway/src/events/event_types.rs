//! Gateway event types
//!
//! Defines all event type names for dispatch messages.

use chat_cache::event_types;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Gateway event types
///
/// These are the event names sent in the `t` field of dispatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEventType {
    // Connection events
    /// Sent after successful Identify
    Ready,

    // Pushes
    /// New message in a subscribed chat
    MessageCreate,
    /// Live notification for the receiving user
    NotificationCreate,
    /// A chat in the user's list changed
    ChatSummaryUpdate,

    // Request replies
    MessageSent,
    ChatHistory,
    MessagesRead,
    ChatList,
    InterlocutorInfo,
    /// A request could not be served; the connection stays open
    RequestFailed,
}

impl GatewayEventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::MessageCreate => event_types::MESSAGE_CREATE,
            Self::NotificationCreate => event_types::NOTIFICATION_CREATE,
            Self::ChatSummaryUpdate => event_types::CHAT_SUMMARY_UPDATE,
            Self::MessageSent => "MESSAGE_SENT",
            Self::ChatHistory => "CHAT_HISTORY",
            Self::MessagesRead => "MESSAGES_READ",
            Self::ChatList => "CHAT_LIST",
            Self::InterlocutorInfo => "INTERLOCUTOR_INFO",
            Self::RequestFailed => "REQUEST_FAILED",
        }
    }

    /// Parse an event type from a string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(Self::Ready),
            "MESSAGE_CREATE" => Some(Self::MessageCreate),
            "NOTIFICATION_CREATE" => Some(Self::NotificationCreate),
            "CHAT_SUMMARY_UPDATE" => Some(Self::ChatSummaryUpdate),
            "MESSAGE_SENT" => Some(Self::MessageSent),
            "CHAT_HISTORY" => Some(Self::ChatHistory),
            "MESSAGES_READ" => Some(Self::MessagesRead),
            "CHAT_LIST" => Some(Self::ChatList),
            "INTERLOCUTOR_INFO" => Some(Self::InterlocutorInfo),
            "REQUEST_FAILED" => Some(Self::RequestFailed),
            _ => None,
        }
    }

    /// Whether this event originates from another component rather than a reply
    #[must_use]
    pub const fn is_push(self) -> bool {
        matches!(
            self,
            Self::MessageCreate | Self::NotificationCreate | Self::ChatSummaryUpdate
        )
    }
}

impl fmt::Display for GatewayEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<GatewayEventType> for String {
    fn from(event: GatewayEventType) -> Self {
        event.as_str().to_string()
    }
}
