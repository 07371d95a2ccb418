//! Participant entity - a user's membership in a chat

use crate::value_objects::Snowflake;

/// Per-member chat state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub chat_id: Snowflake,
    pub user_id: Snowflake,
    pub chat_terms_accepted: bool,
}

impl Participant {
    /// Create a participant that has not accepted the chat terms yet
    pub fn new(chat_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            chat_id,
            user_id,
            chat_terms_accepted: false,
        }
    }
}
