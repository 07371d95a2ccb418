//! Connection management
//!
//! Tracks WebSocket connections and their topic subscriptions.

mod connection;
mod manager;

pub use connection::{generate_session_id, Connection, ConnectionState, Outbound};
pub use manager::{ConnectionManager, Removal};
