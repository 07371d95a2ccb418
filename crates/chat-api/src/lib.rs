//! # chat-api
//!
//! REST surface of the chat subsystem, built with Axum: chats, message
//! history, terms, notifications and online statistics under `/api/v1`.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run};
pub use state::AppState;
