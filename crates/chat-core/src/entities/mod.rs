//! Domain entities - core business objects

mod chat;
mod message;
mod notification;
mod participant;
mod user;

pub use chat::Chat;
pub use message::Message;
pub use notification::{Notification, NotificationPayload};
pub use participant::Participant;
pub use user::User;
