//! Session gateway integration tests
//!
//! Same requirements as the API tests: PostgreSQL, Redis, DATABASE_URL,
//! REDIS_URL and JWT_SECRET.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use chat_core::Snowflake;
use chat_service::{ChatDirectoryService, NotificationRouterService};
use integration_tests::{check_test_env, test_config, Closed, Seeder, TestGateway, TestUser};
use serde_json::json;

struct Harness {
    gateway: TestGateway,
    seeder: Seeder,
}

impl Harness {
    async fn start() -> Self {
        let config = test_config().expect("config");
        let seeder = Seeder::connect(&config).await.expect("seeder");
        let gateway = TestGateway::start(config).await.expect("gateway");
        Self { gateway, seeder }
    }

    async fn user(&self, name: &str) -> TestUser {
        self.seeder.user(name).await.expect("seed user")
    }

    async fn chat(&self, a: &TestUser, b: &TestUser) -> Snowflake {
        ChatDirectoryService::new(self.gateway.state.service_context())
            .get_or_create(a.id, b.id, None)
            .await
            .expect("chat")
            .id
    }

    async fn stored_unread(&self, user: &TestUser) -> i64 {
        NotificationRouterService::new(self.gateway.state.service_context())
            .unread_count(user.id)
            .await
            .expect("unread count")
    }
}

// ============================================================================
// Handshake
// ============================================================================

#[tokio::test]
async fn test_identify_dispatches_ready() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let user = h.user("buyer").await;

    let mut client = h.gateway.connect().await.unwrap();
    client.identify(&user.token).await.unwrap();
    let ready = client.wait_for("READY").await.unwrap();

    assert_eq!(ready["user_id"], user.id.to_string());
    assert!(ready["session_id"].as_str().is_some_and(|s| !s.is_empty()));
}

#[tokio::test]
async fn test_bad_token_closes_with_auth_failed() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let mut client = h.gateway.connect().await.unwrap();
    client.identify("not-a-jwt").await.unwrap();

    assert_eq!(client.wait_for_close().await.unwrap(), Closed::Code(4004));
}

#[tokio::test]
async fn test_request_before_identify_closes() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let mut client = h.gateway.connect().await.unwrap();
    client.request("n1", "LIST_CHATS", None).await.unwrap();

    assert_eq!(client.wait_for_close().await.unwrap(), Closed::Code(4003));
}

#[tokio::test]
async fn test_heartbeat_is_acked() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let user = h.user("buyer").await;
    let mut client = h.gateway.connect_as(&user.token).await.unwrap();

    client.heartbeat(Some(1)).await.unwrap();
    let ack = client.wait_for_op(11).await.unwrap();
    assert_eq!(ack["op"], 11);
}

#[tokio::test]
async fn test_second_session_replaces_first() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let user = h.user("buyer").await;

    let mut first = h.gateway.connect_as(&user.token).await.unwrap();
    let _second = h.gateway.connect_as(&user.token).await.unwrap();

    let invalid = first.wait_for_op(7).await.unwrap();
    assert_eq!(invalid["d"], false);
    assert_eq!(first.wait_for_close().await.unwrap(), Closed::Code(4010));
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_send_message_reply_and_live_push() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat_id = h.chat(&buyer, &seller).await;

    let mut seller_client = h.gateway.connect_as(&seller.token).await.unwrap();
    let mut buyer_client = h.gateway.connect_as(&buyer.token).await.unwrap();

    buyer_client
        .request(
            "send-1",
            "SEND_MESSAGE",
            Some(json!({ "chat_id": chat_id.to_string(), "text": "Hi there" })),
        )
        .await
        .unwrap();

    let sent = buyer_client.wait_for("MESSAGE_SENT").await.unwrap();
    assert_eq!(sent["nonce"], "send-1");
    assert_eq!(sent["data"]["text"], "Hi there");
    assert_eq!(sent["data"]["receiver_id"], seller.id.to_string());

    // Online receiver: pushed live, nothing stored
    let notification = seller_client.wait_for("NOTIFICATION_CREATE").await.unwrap();
    assert!(notification["body"]
        .as_str()
        .is_some_and(|body| body.contains("Hi there")));
    assert_eq!(h.stored_unread(&seller).await, 0);

    let summary = seller_client.wait_for("CHAT_SUMMARY_UPDATE").await.unwrap();
    assert_eq!(summary["chat_id"], chat_id.to_string());
    assert_eq!(summary["unread_count"], 1);
}

#[tokio::test]
async fn test_subscribed_participant_receives_message_create() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat_id = h.chat(&buyer, &seller).await;

    let mut seller_client = h.gateway.connect_as(&seller.token).await.unwrap();
    let mut buyer_client = h.gateway.connect_as(&buyer.token).await.unwrap();

    // Loading history subscribes the seller to the chat topic
    seller_client
        .request("h", "LOAD_HISTORY", Some(json!({ "chat_id": chat_id.to_string() })))
        .await
        .unwrap();
    let history = seller_client.wait_for("CHAT_HISTORY").await.unwrap();
    assert_eq!(history["data"]["messages"], json!([]));

    buyer_client
        .request(
            "s",
            "SEND_MESSAGE",
            Some(json!({ "chat_id": chat_id.to_string(), "text": "Ping" })),
        )
        .await
        .unwrap();

    let created = seller_client.wait_for("MESSAGE_CREATE").await.unwrap();
    assert_eq!(created["text"], "Ping");
    assert_eq!(created["sender_id"], buyer.id.to_string());
}

#[tokio::test]
async fn test_list_chats_and_mark_read() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat_id = h.chat(&buyer, &seller).await;

    let mut buyer_client = h.gateway.connect_as(&buyer.token).await.unwrap();
    buyer_client
        .request(
            "s",
            "SEND_MESSAGE",
            Some(json!({ "chat_id": chat_id.to_string(), "text": "Offer" })),
        )
        .await
        .unwrap();
    buyer_client.wait_for("MESSAGE_SENT").await.unwrap();

    let mut seller_client = h.gateway.connect_as(&seller.token).await.unwrap();
    seller_client.request("l", "LIST_CHATS", None).await.unwrap();
    let list = seller_client.wait_for("CHAT_LIST").await.unwrap();
    assert_eq!(list["nonce"], "l");
    assert_eq!(list["data"]["chats"][0]["chat_id"], chat_id.to_string());
    assert_eq!(list["data"]["chats"][0]["unread_count"], 1);

    seller_client
        .request("r", "MARK_READ", Some(json!({ "chat_id": chat_id.to_string() })))
        .await
        .unwrap();
    let read = seller_client.wait_for("MESSAGES_READ").await.unwrap();
    assert_eq!(read["data"]["updated"], 1);

    seller_client
        .request("i", "FETCH_INTERLOCUTOR", Some(json!({ "chat_id": chat_id.to_string() })))
        .await
        .unwrap();
    let other = seller_client.wait_for("INTERLOCUTOR_INFO").await.unwrap();
    assert_eq!(other["data"]["name"], buyer.name);
}

#[tokio::test]
async fn test_failed_request_keeps_connection_open() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let outsider = h.user("outsider").await;
    let chat_id = h.chat(&buyer, &seller).await;

    let mut client = h.gateway.connect_as(&outsider.token).await.unwrap();

    client
        .request("x", "LOAD_HISTORY", Some(json!({ "chat_id": chat_id.to_string() })))
        .await
        .unwrap();
    let failed = client.wait_for("REQUEST_FAILED").await.unwrap();
    assert_eq!(failed["nonce"], "x");
    assert_eq!(failed["code"], "FORBIDDEN_PARTICIPANT");

    client.request("y", "NOT_AN_OPERATION", None).await.unwrap();
    let failed = client.wait_for("REQUEST_FAILED").await.unwrap();
    assert_eq!(failed["nonce"], "y");
    assert_eq!(failed["code"], "INVALID_REQUEST");

    // Still usable afterwards
    client.request("z", "LIST_CHATS", None).await.unwrap();
    let list = client.wait_for("CHAT_LIST").await.unwrap();
    assert_eq!(list["data"]["chats"], json!([]));
}

#[tokio::test]
async fn test_overlong_message_is_rejected() {
    if !check_test_env() {
        return;
    }

    let h = Harness::start().await;
    let buyer = h.user("buyer").await;
    let seller = h.user("seller").await;
    let chat_id = h.chat(&buyer, &seller).await;

    let mut client = h.gateway.connect_as(&buyer.token).await.unwrap();
    client
        .request(
            "long",
            "SEND_MESSAGE",
            Some(json!({ "chat_id": chat_id.to_string(), "text": "x".repeat(4001) })),
        )
        .await
        .unwrap();

    let failed = client.wait_for("REQUEST_FAILED").await.unwrap();
    assert_eq!(failed["code"], "MESSAGE_TOO_LONG");
}
