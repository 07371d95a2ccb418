//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.

mod chat;
mod error;
mod listing;
mod message;
mod notification;
mod participant;
mod user;

pub use chat::PgChatRepository;
pub use listing::PgListingRepository;
pub use message::PgMessageRepository;
pub use notification::PgNotificationRepository;
pub use participant::PgParticipantRepository;
pub use user::PgUserRepository;
