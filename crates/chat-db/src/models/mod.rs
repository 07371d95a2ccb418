//! Database models - SQLx-compatible structs for PostgreSQL tables

mod chat;
mod message;
mod notification;
mod user;

pub use chat::{ChatModel, ParticipantModel};
pub use message::MessageModel;
pub use notification::NotificationModel;
pub use user::UserModel;
