//! # chat-gateway
//!
//! WebSocket session gateway for the marketplace chat.
//!
//! - Authenticates a connection with Identify and registers it as the user's
//!   live presence handle
//! - Serves the five chat requests (send, history, mark read, chat list,
//!   interlocutor) behind the participant guard
//! - Forwards per-chat and per-user Pub/Sub events to local connections

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, GatewayState};
