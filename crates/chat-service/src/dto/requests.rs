//! Request DTOs
//!
//! Inputs for the REST API. Ids accept either JSON strings or integers.

use chat_core::Snowflake;
use serde::Deserialize;
use validator::Validate;

/// Open (or reopen) the chat with a seller, optionally about a listing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChatRequest {
    pub seller_id: Snowflake,
    #[serde(default)]
    pub listing_id: Option<Snowflake>,
}
