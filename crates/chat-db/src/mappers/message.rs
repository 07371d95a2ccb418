//! Message entity <-> model mapper

use chat_core::entities::Message;
use chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            chat_id: Snowflake::new(model.chat_id),
            sender_id: Snowflake::new(model.sender_id),
            receiver_id: Snowflake::new(model.receiver_id),
            text: model.text,
            sent_at: model.sent_at,
            is_read: model.is_read,
        }
    }
}

/// Message entity values for insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub text: &'a str,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            chat_id: message.chat_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            receiver_id: message.receiver_id.into_inner(),
            text: &message.text,
            sent_at: message.sent_at,
        }
    }
}
