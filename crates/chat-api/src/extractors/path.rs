//! Path parameter extractors
//!
//! Snowflake ids arrive as strings in the path and are parsed on demand.

use chat_core::Snowflake;
use serde::Deserialize;

use crate::response::ApiError;

/// Path parameters with chat_id
#[derive(Debug, Deserialize)]
pub struct ChatIdPath {
    pub chat_id: String,
}

impl ChatIdPath {
    pub fn chat_id(&self) -> Result<Snowflake, ApiError> {
        self.chat_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid chat_id format"))
    }
}

/// Path parameters with notification_id
#[derive(Debug, Deserialize)]
pub struct NotificationIdPath {
    pub notification_id: String,
}

impl NotificationIdPath {
    pub fn notification_id(&self) -> Result<Snowflake, ApiError> {
        self.notification_id
            .parse()
            .map_err(|_| ApiError::invalid_path("Invalid notification_id format"))
    }
}
