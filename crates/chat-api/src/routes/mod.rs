//! Route definitions
//!
//! API routes mounted under /api/v1; health probes live at the root.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{chats, health, notifications, stats};
use crate::state::AppState;

/// API router (health is merged separately so it skips rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(chat_routes())
        .merge(notification_routes())
        .merge(stats_routes())
}

fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chats", post(chats::create_chat).get(chats::list_chats))
        .route("/chats/temporary", delete(chats::purge_temporary_chats))
        .route("/chats/:chat_id/messages", get(chats::get_messages))
        .route("/chats/:chat_id/read", post(chats::mark_read))
        .route(
            "/chats/:chat_id/terms",
            get(chats::get_terms).post(chats::accept_terms),
        )
        .route("/chats/:chat_id/interlocutor", get(chats::get_interlocutor))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route(
            "/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
}

fn stats_routes() -> Router<AppState> {
    Router::new().route("/stats/online", get(stats::online_stats))
}
