//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Listing not found: {0}")]
    ListingNotFound(Snowflake),

    #[error("Chat not found: {0}")]
    ChatNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Notification not found: {0}")]
    NotificationNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid participants: {0}")]
    InvalidParticipants(String),

    #[error("Message text must not be empty")]
    EmptyMessage,

    #[error("Message too long: max {max} characters")]
    MessageTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("User {user_id} is not a participant of chat {chat_id}")]
    ForbiddenParticipant {
        chat_id: Snowflake,
        user_id: Snowflake,
    },

    #[error("User {user_id} is not the recipient of notification {notification_id}")]
    ForbiddenRecipient {
        notification_id: Snowflake,
        user_id: Snowflake,
    },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Chat already exists for this pair and listing")]
    ChatAlreadyExists,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ListingNotFound(_) => "UNKNOWN_LISTING",
            Self::ChatNotFound(_) => "UNKNOWN_CHAT",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::NotificationNotFound(_) => "UNKNOWN_NOTIFICATION",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidParticipants(_) => "INVALID_PARTICIPANTS",
            Self::EmptyMessage => "EMPTY_MESSAGE",
            Self::MessageTooLong { .. } => "MESSAGE_TOO_LONG",

            // Authorization
            Self::ForbiddenParticipant { .. } => "FORBIDDEN_PARTICIPANT",
            Self::ForbiddenRecipient { .. } => "FORBIDDEN_RECIPIENT",

            // Conflict
            Self::ChatAlreadyExists => "CHAT_ALREADY_EXISTS",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::ListingNotFound(_)
                | Self::ChatNotFound(_)
                | Self::MessageNotFound(_)
                | Self::NotificationNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidParticipants(_)
                | Self::EmptyMessage
                | Self::MessageTooLong { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::ForbiddenParticipant { .. } | Self::ForbiddenRecipient { .. }
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ChatAlreadyExists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DomainError::ChatNotFound(Snowflake::new(1)).code(), "UNKNOWN_CHAT");
        assert_eq!(DomainError::EmptyMessage.code(), "EMPTY_MESSAGE");
        let err = DomainError::ForbiddenParticipant {
            chat_id: Snowflake::new(1),
            user_id: Snowflake::new(2),
        };
        assert_eq!(err.code(), "FORBIDDEN_PARTICIPANT");
    }

    #[test]
    fn test_categories() {
        assert!(DomainError::NotificationNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::InvalidParticipants("same".into()).is_validation());
        assert!(DomainError::ForbiddenRecipient {
            notification_id: Snowflake::new(1),
            user_id: Snowflake::new(2),
        }
        .is_authorization());
        assert!(DomainError::ChatAlreadyExists.is_conflict());
        assert!(!DomainError::ChatAlreadyExists.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::MessageTooLong { max: 4000 };
        assert_eq!(err.to_string(), "Message too long: max 4000 characters");

        let err = DomainError::ChatNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "Chat not found: 123");
    }
}
