//! Event payload definitions
//!
//! Data carried by the gateway's own dispatches. Push payloads come from
//! `chat-service` DTOs unchanged.

use chat_core::Snowflake;
use chat_service::dto::{ChatSummaryResponse, MessageResponse};
use serde::{Deserialize, Serialize};

// === Connection Events ===

/// READY event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    pub session_id: String,
    pub user_id: Snowflake,
}

// === Request Replies ===

/// Reply to a request, echoing its nonce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestReply<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub data: T,
}

impl<T> RequestReply<T> {
    pub fn new(nonce: Option<String>, data: T) -> Self {
        Self { nonce, data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryEvent {
    pub chat_id: Snowflake,
    pub messages: Vec<MessageResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesReadEvent {
    pub chat_id: Snowflake,
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListEvent {
    pub chats: Vec<ChatSummaryResponse>,
}

/// REQUEST_FAILED payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFailedEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub code: String,
    pub message: String,
}
