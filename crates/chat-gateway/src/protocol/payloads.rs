//! Client payload definitions
//!
//! Defines the payload structures for client-to-server frames.

use chat_core::Snowflake;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Access token, with or without the `Bearer ` prefix
    pub token: String,
}

impl IdentifyPayload {
    /// The raw token without the `Bearer ` prefix
    #[must_use]
    pub fn bare_token(&self) -> &str {
        self.token.strip_prefix("Bearer ").unwrap_or(&self.token)
    }
}

/// The closed set of operations a client may request (op 3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientOperation {
    SendMessage { chat_id: Snowflake, text: String },
    LoadHistory { chat_id: Snowflake },
    MarkRead { chat_id: Snowflake },
    ListChats,
    FetchInterlocutor { chat_id: Snowflake },
}

impl ClientOperation {
    /// Chat the operation targets, if it is chat-scoped
    #[must_use]
    pub const fn chat_id(&self) -> Option<Snowflake> {
        match self {
            Self::SendMessage { chat_id, .. }
            | Self::LoadHistory { chat_id }
            | Self::MarkRead { chat_id }
            | Self::FetchInterlocutor { chat_id } => Some(*chat_id),
            Self::ListChats => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SendMessage { .. } => "SEND_MESSAGE",
            Self::LoadHistory { .. } => "LOAD_HISTORY",
            Self::MarkRead { .. } => "MARK_READ",
            Self::ListChats => "LIST_CHATS",
            Self::FetchInterlocutor { .. } => "FETCH_INTERLOCUTOR",
        }
    }
}

/// Payload for op 3 (Request): `{ nonce?, type, data }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    /// Opaque client value echoed in the reply
    pub nonce: Option<String>,
    pub operation: ClientOperation,
}

#[derive(Deserialize)]
struct RequestNonce {
    #[serde(default)]
    nonce: Option<String>,
}

impl ClientRequest {
    /// Decode from the frame's `d` field
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        let RequestNonce { nonce } = RequestNonce::deserialize(value)?;
        let operation = ClientOperation::deserialize(value)?;
        Ok(Self { nonce, operation })
    }
}
