//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod chats;
pub mod health;
pub mod notifications;
pub mod stats;
