//! Entity to DTO mappers

use chat_core::entities::{Chat, Message, Notification, User};

use super::responses::{ChatResponse, InterlocutorResponse, MessageResponse, NotificationResponse};

impl From<&Chat> for ChatResponse {
    fn from(chat: &Chat) -> Self {
        Self {
            id: chat.id.to_string(),
            listing_id: chat.listing_id.map(|id| id.to_string()),
            temporary: chat.temporary,
            participants: chat
                .participants
                .members()
                .iter()
                .map(ToString::to_string)
                .collect(),
            created_at: chat.created_at,
        }
    }
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self::from(&chat)
    }
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            chat_id: message.chat_id.to_string(),
            sender_id: message.sender_id.to_string(),
            receiver_id: message.receiver_id.to_string(),
            text: message.text.clone(),
            sent_at: message.sent_at,
            is_read: message.is_read,
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id.to_string(),
            chat_id: message.chat_id.to_string(),
            sender_id: message.sender_id.to_string(),
            receiver_id: message.receiver_id.to_string(),
            text: message.text,
            sent_at: message.sent_at,
            is_read: message.is_read,
        }
    }
}

impl From<&User> for InterlocutorResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            title: notification.payload.title,
            body: notification.payload.body,
            link: notification.payload.link,
            created_at: notification.created_at,
            is_read: notification.is_read,
        }
    }
}
