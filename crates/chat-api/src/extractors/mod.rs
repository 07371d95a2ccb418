//! Axum extractors for request handling
//!
//! Custom extractors for authentication, validation, path ids and query
//! limits.

mod auth;
mod limit;
mod path;
mod validated;

pub use auth::AuthUser;
pub use limit::{HistoryLimit, HistoryLimitParams};
pub use path::{ChatIdPath, NotificationIdPath};
pub use validated::ValidatedJson;
