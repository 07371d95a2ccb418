//! Chat entity - a two-party conversation, optionally about a listing

use chrono::{DateTime, Utc};

use crate::value_objects::{ParticipantPair, Snowflake};

/// Chat entity
///
/// A chat starts out temporary and becomes permanent with its first
/// message. Temporary chats without messages can be purged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: Snowflake,
    pub participants: ParticipantPair,
    pub listing_id: Option<Snowflake>,
    pub temporary: bool,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    /// Create a new temporary chat
    pub fn new(id: Snowflake, participants: ParticipantPair, listing_id: Option<Snowflake>) -> Self {
        Self {
            id,
            participants,
            listing_id,
            temporary: true,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn has_member(&self, user_id: Snowflake) -> bool {
        self.participants.contains(user_id)
    }

    /// The other member of the chat as seen by `user_id`
    #[inline]
    pub fn interlocutor_of(&self, user_id: Snowflake) -> Option<Snowflake> {
        self.participants.other(user_id)
    }
}
