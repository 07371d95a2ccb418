//! Entity to model mappers
//!
//! - `From<Model> for Entity` (or `TryFrom` where the row must be validated)
//! - `*Insert` structs: entity data prepared for binding

mod chat;
mod message;
mod notification;
mod user;

pub use chat::ChatInsert;
pub use message::MessageInsert;
pub use notification::NotificationInsert;
