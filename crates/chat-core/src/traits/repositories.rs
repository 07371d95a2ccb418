//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Every mutation here is a single atomic
//! statement so two participants acting on the same chat at the same
//! instant never overwrite each other.

use async_trait::async_trait;

use crate::entities::{Chat, Message, Notification, Participant, User};
use crate::error::DomainError;
use crate::value_objects::{ParticipantPair, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository (read-only)
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Check whether a user exists
    async fn exists(&self, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Listing Repository (read-only)
// ============================================================================

#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Check whether a listing exists
    async fn exists(&self, id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Chat Repository
// ============================================================================

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Find chat by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>>;

    /// Find the chat for a participant pair within a listing context
    /// (`None` is its own context)
    async fn find_by_pair(
        &self,
        pair: ParticipantPair,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Chat>>;

    /// Create a chat together with both participant records.
    ///
    /// Returns [`DomainError::ChatAlreadyExists`] when a chat for the same
    /// pair and listing was created concurrently.
    async fn create(&self, chat: &Chat) -> RepoResult<()>;

    /// List all chats a user participates in
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>>;

    /// Flip `temporary` to false; returns whether this call changed it
    async fn mark_permanent(&self, id: Snowflake) -> RepoResult<bool>;

    /// Delete the user's temporary chats that have no messages; returns the
    /// deleted chat ids
    async fn delete_empty_temporary(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>>;
}

// ============================================================================
// Participant Repository
// ============================================================================

#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Find a user's participant record in a chat
    async fn find(&self, chat_id: Snowflake, user_id: Snowflake)
        -> RepoResult<Option<Participant>>;

    /// Set `chat_terms_accepted` for one participant; returns false if the
    /// record does not exist
    async fn accept_terms(&self, chat_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Store a message and return it as persisted.
    ///
    /// `sent_at` may be moved forward so it never precedes the chat's
    /// latest stored message.
    async fn create(&self, message: &Message) -> RepoResult<Message>;

    /// All messages of a chat ordered by `sent_at`, then id
    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Vec<Message>>;

    /// Most recent message of a chat
    async fn find_last(&self, chat_id: Snowflake) -> RepoResult<Option<Message>>;

    /// Mark every unread message addressed to `reader_id` as read; returns
    /// the number of rows changed
    async fn mark_read(&self, chat_id: Snowflake, reader_id: Snowflake) -> RepoResult<u64>;

    /// Count unread messages addressed to `reader_id`
    async fn count_unread(&self, chat_id: Snowflake, reader_id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Notification Repository
// ============================================================================

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Find notification by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Notification>>;

    /// List a recipient's notifications, newest first
    async fn find_by_recipient(&self, recipient_id: Snowflake) -> RepoResult<Vec<Notification>>;

    /// Store an offline notification
    async fn create(&self, notification: &Notification) -> RepoResult<()>;

    /// Flip `is_read`; returns whether this call changed it
    async fn mark_read(&self, id: Snowflake) -> RepoResult<bool>;

    /// Count unread notifications of a recipient
    async fn count_unread(&self, recipient_id: Snowflake) -> RepoResult<i64>;
}
