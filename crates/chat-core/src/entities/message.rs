//! Message entity - a single chat message

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Message entity
///
/// Immutable once stored except for `is_read`, which belongs to the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Snowflake,
    pub chat_id: Snowflake,
    pub sender_id: Snowflake,
    pub receiver_id: Snowflake,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Message {
    /// Maximum message length in characters
    pub const MAX_LENGTH: usize = 4000;

    /// Create a new unread Message
    pub fn new(
        id: Snowflake,
        chat_id: Snowflake,
        sender_id: Snowflake,
        receiver_id: Snowflake,
        text: String,
    ) -> Self {
        Self {
            id,
            chat_id,
            sender_id,
            receiver_id,
            text,
            sent_at: Utc::now(),
            is_read: false,
        }
    }

    /// Validate message text before it is stored
    pub fn validate_text(text: &str) -> Result<(), DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        if text.chars().count() > Self::MAX_LENGTH {
            return Err(DomainError::MessageTooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(())
    }
}
