//! Response DTOs
//!
//! Snowflake ids are serialized as strings for JavaScript compatibility.
//! Chat summaries double as the `CHAT_SUMMARY_UPDATE` push payload.

use chat_cache::OnlineSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Chat Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    pub temporary: bool,
    pub participants: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Display data of the other participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterlocutorResponse {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// One row of a user's chat list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummaryResponse {
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    pub temporary: bool,
    pub interlocutor: InterlocutorResponse,
    pub last_message: Option<MessageResponse>,
    pub unread_count: i64,
    pub terms_accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatSummaryResponse {
    /// Time of the last message, else chat creation
    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_message
            .as_ref()
            .map_or(self.created_at, |message| message.sent_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermsStateResponse {
    pub chat_id: String,
    pub chat_terms_accepted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub deleted: usize,
}

// ============================================================================
// Message Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

// ============================================================================
// Notification Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub body: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

// ============================================================================
// Stats and Health Responses
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OnlineStatsResponse {
    /// Latest snapshot, absent until the gateway has recorded one
    pub current: Option<OnlineSnapshot>,
    pub history: Vec<OnlineSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Per-dependency health
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
}

impl ReadinessResponse {
    #[must_use]
    pub fn ready(database_healthy: bool, redis_healthy: bool) -> Self {
        let label = |healthy: bool| if healthy { "healthy" } else { "unhealthy" }.to_string();
        Self {
            status: if database_healthy && redis_healthy {
                "ready"
            } else {
                "not_ready"
            }
            .to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: label(database_healthy),
                redis: label(redis_healthy),
            },
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
