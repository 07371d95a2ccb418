//! Chat and participant entity <-> model mapper

use chat_core::entities::{Chat, Participant};
use chat_core::error::DomainError;
use chat_core::value_objects::{ParticipantPair, Snowflake};

use crate::models::{ChatModel, ParticipantModel};

/// Rows violating the ordered-pair check surface as a database error
impl TryFrom<ChatModel> for Chat {
    type Error = DomainError;

    fn try_from(model: ChatModel) -> Result<Self, Self::Error> {
        let participants =
            ParticipantPair::new(Snowflake::new(model.user_low), Snowflake::new(model.user_high))
                .map_err(|_| {
                    DomainError::DatabaseError(format!("chat {} has a degenerate pair", model.id))
                })?;

        Ok(Chat {
            id: Snowflake::new(model.id),
            participants,
            listing_id: model.listing_id.map(Snowflake::new),
            temporary: model.temporary,
            created_at: model.created_at,
        })
    }
}

impl From<ParticipantModel> for Participant {
    fn from(model: ParticipantModel) -> Self {
        Participant {
            chat_id: Snowflake::new(model.chat_id),
            user_id: Snowflake::new(model.user_id),
            chat_terms_accepted: model.chat_terms_accepted,
        }
    }
}

/// Chat entity values for insertion
pub struct ChatInsert {
    pub id: i64,
    pub user_low: i64,
    pub user_high: i64,
    pub listing_id: Option<i64>,
    pub temporary: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChatInsert {
    pub fn new(chat: &Chat) -> Self {
        Self {
            id: chat.id.into_inner(),
            user_low: chat.participants.low().into_inner(),
            user_high: chat.participants.high().into_inner(),
            listing_id: chat.listing_id.map(Snowflake::into_inner),
            temporary: chat.temporary,
            created_at: chat.created_at,
        }
    }
}
