//! REST API integration tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Running Redis instance
//! - Environment variables: DATABASE_URL, REDIS_URL, JWT_SECRET
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chat_core::Snowflake;
use chat_service::{
    ChatResponse, ChatSummaryResponse, InterlocutorResponse, MarkReadResponse,
    MessagePipelineService, MessageResponse, NotificationResponse, PurgeResponse,
    TermsStateResponse, UnreadCountResponse,
};
use integration_tests::{
    assert_error, assert_json, check_test_env, test_config, OpenChat, Seeder, TestServer, TestUser,
};
use reqwest::StatusCode;
use serde_json::{json, Value};

struct Harness {
    server: TestServer,
    seeder: Seeder,
}

impl Harness {
    async fn start() -> Self {
        let config = test_config().expect("config");
        let seeder = Seeder::connect(&config).await.expect("seeder");
        let server = TestServer::start_with_config(config).await.expect("server");
        Self { server, seeder }
    }

    async fn user(&self, name: &str) -> TestUser {
        self.seeder.user(name).await.expect("seed user")
    }

    async fn open_chat(&self, buyer: &TestUser, body: &OpenChat) -> ChatResponse {
        let response = self
            .server
            .post_auth("/api/v1/chats", &buyer.token, body)
            .await
            .unwrap();
        assert_json(response, StatusCode::OK).await.unwrap()
    }

    /// Messages enter through the gateway; tests drive the pipeline directly
    async fn send(&self, chat: &ChatResponse, from: &TestUser, text: &str) -> MessageResponse {
        let chat_id: Snowflake = chat.id.parse().unwrap();
        let message = MessagePipelineService::new(self.server.state.service_context())
            .send(chat_id, from.id, text.to_string())
            .await
            .expect("send");
        message.into()
    }
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["checks"]["database"], "healthy");
    assert_eq!(body["checks"]["redis"], "healthy");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server.get("/api/v1/chats").await.unwrap();
    let code = assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
    assert_eq!(code, "MISSING_AUTHORIZATION");
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    if !check_test_env() {
        return;
    }

    let server = TestServer::start().await.unwrap();
    let response = server.get_auth("/api/v1/chats", "not-a-jwt").await.unwrap();
    assert_error(response, StatusCode::UNAUTHORIZED).await.unwrap();
}

// ============================================================================
// Chat Directory Tests
// ============================================================================

#[tokio::test]
async fn test_open_chat_is_idempotent() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;

    let first = h.open_chat(&buyer, &OpenChat::with(&seller)).await;
    assert!(first.temporary);
    assert!(first.participants.contains(&buyer.id.to_string()));
    assert!(first.participants.contains(&seller.id.to_string()));

    // Same pair from the other side resolves to the same chat
    let again = h.open_chat(&seller, &OpenChat::with(&buyer)).await;
    assert_eq!(again.id, first.id);
}

#[tokio::test]
async fn test_listing_context_separates_chats() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let listing = h.seeder.listing(&seller, "Road bike").await.unwrap();

    let general = h.open_chat(&buyer, &OpenChat::with(&seller)).await;
    let about = h.open_chat(&buyer, &OpenChat::about(&seller, listing)).await;

    assert_ne!(general.id, about.id);
    assert_eq!(about.listing_id, Some(listing.to_string()));
}

#[tokio::test]
async fn test_open_chat_rejects_bad_participants() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;

    let response = h
        .server
        .post_auth("/api/v1/chats", &buyer.token, &OpenChat::with(&buyer))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PARTICIPANTS");

    let nobody = json!({ "seller_id": "1" });
    let response = h
        .server
        .post_auth("/api/v1/chats", &buyer.token, &nobody)
        .await
        .unwrap();
    assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
}

#[tokio::test]
async fn test_open_chat_unknown_listing() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;

    let body = OpenChat::about(&seller, Snowflake::new(1));
    let response = h.server.post_auth("/api/v1/chats", &buyer.token, &body).await.unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_LISTING");
}

#[tokio::test]
async fn test_open_chat_malformed_body() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;

    let response = h
        .server
        .post_auth("/api/v1/chats", &buyer.token, &json!({ "seller": 5 }))
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_BODY");
}

#[tokio::test]
async fn test_chat_list_summaries() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;
    h.send(&chat, &seller, "Still available").await;

    let response = h.server.get_auth("/api/v1/chats", &buyer.token).await.unwrap();
    let chats: Vec<ChatSummaryResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(chats.len(), 1);
    let summary = &chats[0];
    assert_eq!(summary.chat_id, chat.id);
    assert_eq!(summary.interlocutor.name, seller.name);
    assert_eq!(summary.unread_count, 1);
    assert!(!summary.temporary);
    assert!(!summary.terms_accepted);
    assert_eq!(
        summary.last_message.as_ref().map(|m| m.text.as_str()),
        Some("Still available")
    );
}

#[tokio::test]
async fn test_terms_are_per_participant() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;
    let path = format!("/api/v1/chats/{}/terms", chat.id);

    let response = h.server.get_auth(&path, &buyer.token).await.unwrap();
    let terms: TermsStateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!terms.chat_terms_accepted);

    let response = h.server.post_empty_auth(&path, &buyer.token).await.unwrap();
    let terms: TermsStateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(terms.chat_terms_accepted);

    // Accepting twice is harmless
    let response = h.server.post_empty_auth(&path, &buyer.token).await.unwrap();
    let terms: TermsStateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(terms.chat_terms_accepted);

    let response = h.server.get_auth(&path, &seller.token).await.unwrap();
    let terms: TermsStateResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(!terms.chat_terms_accepted);
}

#[tokio::test]
async fn test_interlocutor() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;

    let path = format!("/api/v1/chats/{}/interlocutor", chat.id);
    let response = h.server.get_auth(&path, &buyer.token).await.unwrap();
    let other: InterlocutorResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(other.id, seller.id.to_string());
    assert_eq!(other.name, seller.name);
}

#[tokio::test]
async fn test_outsider_is_forbidden() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let outsider = h.user("outsider").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;

    for path in [
        format!("/api/v1/chats/{}/messages", chat.id),
        format!("/api/v1/chats/{}/terms", chat.id),
        format!("/api/v1/chats/{}/interlocutor", chat.id),
    ] {
        let response = h.server.get_auth(&path, &outsider.token).await.unwrap();
        let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
        assert_eq!(code, "FORBIDDEN_PARTICIPANT");
    }
}

#[tokio::test]
async fn test_invalid_chat_id() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;

    let response = h
        .server
        .get_auth("/api/v1/chats/not-an-id/messages", &buyer.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(code, "INVALID_PATH_PARAMETER");

    let response = h
        .server
        .get_auth("/api/v1/chats/1/messages", &buyer.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_CHAT");
}

#[tokio::test]
async fn test_purge_keeps_chats_with_history() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let talkative = h.user("seller").await;
    let silent = h.user("seller").await;

    let kept = h.open_chat(&buyer, &OpenChat::with(&talkative)).await;
    h.send(&kept, &buyer, "Hello").await;
    h.open_chat(&buyer, &OpenChat::with(&silent)).await;

    let response = h
        .server
        .delete_auth("/api/v1/chats/temporary", &buyer.token)
        .await
        .unwrap();
    let purge: PurgeResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(purge.deleted, 1);

    let response = h.server.get_auth("/api/v1/chats", &buyer.token).await.unwrap();
    let chats: Vec<ChatSummaryResponse> = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].chat_id, kept.id);
}

// ============================================================================
// Message Tests
// ============================================================================

#[tokio::test]
async fn test_history_marks_read_first() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;

    h.send(&chat, &buyer, "Is it still for sale?").await;
    h.send(&chat, &seller, "Yes").await;
    h.send(&chat, &seller, "Pick up on Friday?").await;

    let path = format!("/api/v1/chats/{}/messages", chat.id);
    let response = h.server.get_auth(&path, &buyer.token).await.unwrap();
    let history: Vec<MessageResponse> = assert_json(response, StatusCode::OK).await.unwrap();

    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, ["Is it still for sale?", "Yes", "Pick up on Friday?"]);
    assert!(history
        .iter()
        .filter(|m| m.receiver_id == buyer.id.to_string())
        .all(|m| m.is_read));
    // The buyer's own message stays unread until the seller reads
    assert!(!history[0].is_read);
}

#[tokio::test]
async fn test_mark_read_counts() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;
    h.send(&chat, &seller, "One").await;
    h.send(&chat, &seller, "Two").await;

    let path = format!("/api/v1/chats/{}/read", chat.id);
    let response = h.server.post_empty_auth(&path, &buyer.token).await.unwrap();
    let read: MarkReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(read.updated, 2);

    let response = h.server.post_empty_auth(&path, &buyer.token).await.unwrap();
    let read: MarkReadResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(read.updated, 0);
}

// ============================================================================
// Notification Tests
// ============================================================================

#[tokio::test]
async fn test_offline_receiver_gets_stored_notification() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat = h.open_chat(&buyer, &OpenChat::with(&seller)).await;
    h.send(&chat, &buyer, "Would you take 80?").await;

    let response = h
        .server
        .get_auth("/api/v1/notifications/unread-count", &seller.token)
        .await
        .unwrap();
    let unread: UnreadCountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.count, 1);

    let response = h
        .server
        .get_auth("/api/v1/notifications", &seller.token)
        .await
        .unwrap();
    let notifications: Vec<NotificationResponse> =
        assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(notifications.len(), 1);
    let notification = &notifications[0];
    assert!(!notification.is_read);
    assert!(notification.body.contains("Would you take 80?"));
    assert!(notification.link.contains(&chat.id));

    // Only the recipient may mark it
    let path = format!("/api/v1/notifications/{}/read", notification.id);
    let response = h.server.post_empty_auth(&path, &buyer.token).await.unwrap();
    let code = assert_error(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(code, "FORBIDDEN_RECIPIENT");

    let response = h.server.post_empty_auth(&path, &seller.token).await.unwrap();
    let marked: NotificationResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert!(marked.is_read);

    let response = h
        .server
        .get_auth("/api/v1/notifications/unread-count", &seller.token)
        .await
        .unwrap();
    let unread: UnreadCountResponse = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(unread.count, 0);
}

#[tokio::test]
async fn test_unknown_notification() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let user = h.user("buyer").await;

    let response = h
        .server
        .post_empty_auth("/api/v1/notifications/1/read", &user.token)
        .await
        .unwrap();
    let code = assert_error(response, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(code, "UNKNOWN_NOTIFICATION");
}

// ============================================================================
// Stats Tests
// ============================================================================

#[tokio::test]
async fn test_online_stats_shape() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let user = h.user("viewer").await;

    let response = h
        .server
        .get_auth("/api/v1/stats/online?limit=5", &user.token)
        .await
        .unwrap();
    let stats: Value = assert_json(response, StatusCode::OK).await.unwrap();
    let history = stats["history"].as_array().expect("history array");
    assert!(history.len() <= 5);
}
