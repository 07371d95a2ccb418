//! Notification entity - user-facing alert about a chat event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Message;
use crate::value_objects::Snowflake;

/// What the recipient sees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub link: String,
}

impl NotificationPayload {
    pub const NEW_MESSAGE_TITLE: &'static str = "New message";

    /// Payload announcing `message`, attributed to `sender_name`
    pub fn for_message(sender_name: &str, message: &Message) -> Self {
        Self {
            title: Self::NEW_MESSAGE_TITLE.to_string(),
            body: format!("{sender_name}: {}", message.text),
            link: format!("/secure/messenger?chatId={}", message.chat_id),
        }
    }
}

/// Notification entity
///
/// Only notifications that could not be pushed live are stored.
/// `Unread -> Read` is the only transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Snowflake,
    pub recipient_id: Snowflake,
    pub payload: NotificationPayload,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    /// Create a new unread Notification
    pub fn new(id: Snowflake, recipient_id: Snowflake, payload: NotificationPayload) -> Self {
        Self {
            id,
            recipient_id,
            payload,
            created_at: Utc::now(),
            is_read: false,
        }
    }

    #[inline]
    pub fn is_recipient(&self, user_id: Snowflake) -> bool {
        self.recipient_id == user_id
    }
}
