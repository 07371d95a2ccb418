//! Chat and participant database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for chats table
#[derive(Debug, Clone, FromRow)]
pub struct ChatModel {
    pub id: i64,
    pub user_low: i64,
    pub user_high: i64,
    pub listing_id: Option<i64>,
    pub temporary: bool,
    pub created_at: DateTime<Utc>,
}

/// Database model for chat_participants table
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantModel {
    pub chat_id: i64,
    pub user_id: i64,
    pub chat_terms_accepted: bool,
}
