//! # chat-core
//!
//! Domain layer for marketplace chat: entities, value objects, errors and
//! repository traits. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Chat, Message, Notification, NotificationPayload, Participant, User};
pub use error::DomainError;
pub use traits::{
    ChatRepository, ListingRepository, MessageRepository, NotificationRepository,
    ParticipantRepository, RepoResult, UserRepository,
};
pub use value_objects::{ParticipantPair, Snowflake, SnowflakeGenerator, SnowflakeParseError};
