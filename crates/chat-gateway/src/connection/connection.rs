//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its state. A connection is
//! also the presence handle registered for its user once identified.

use crate::protocol::{CloseCode, GatewayMessage};
use async_trait::async_trait;
use chat_cache::{DeliveryError, PubSubEvent, SessionHandle};
use chat_core::Snowflake;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::RwLock;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Connection established, waiting for Identify
    Connecting,
    /// Successfully authenticated
    Connected,
    /// Close requested, waiting for the writer to flush
    Disconnecting,
    /// Connection is closed
    Disconnected,
}

/// Item consumed by the connection's writer task
#[derive(Debug, Clone)]
pub enum Outbound {
    Frame(GatewayMessage),
    /// Send a close frame with this code and stop writing
    Close(CloseCode),
}

/// Generate a new random session id
#[must_use]
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A single WebSocket connection
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Authenticated user ID (None until Identify)
    user_id: RwLock<Option<Snowflake>>,

    state: RwLock<ConnectionState>,

    /// Channel to the writer task
    sender: mpsc::Sender<Outbound>,

    /// Last sequence number sent
    sequence: AtomicU64,

    /// Last heartbeat received
    last_heartbeat: RwLock<Instant>,

    /// Chat topics this connection receives `MESSAGE_CREATE` for
    chats: RwLock<HashSet<Snowflake>>,
}

impl Connection {
    pub fn new(session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            session_id,
            user_id: RwLock::new(None),
            state: RwLock::new(ConnectionState::Connecting),
            sender,
            sequence: AtomicU64::new(0),
            last_heartbeat: RwLock::new(Instant::now()),
            chats: RwLock::new(HashSet::new()),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn user_id(&self) -> Option<Snowflake> {
        *self.user_id.read().await
    }

    pub async fn set_user_id(&self, user_id: Snowflake) {
        *self.user_id.write().await = Some(user_id);
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    pub async fn set_state(&self, state: ConnectionState) {
        *self.state.write().await = state;
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user_id.read().await.is_some()
    }

    /// Get the next sequence number
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Record a heartbeat received
    pub async fn record_heartbeat(&self) {
        *self.last_heartbeat.write().await = Instant::now();
    }

    pub async fn time_since_heartbeat(&self) -> std::time::Duration {
        self.last_heartbeat.read().await.elapsed()
    }

    /// Add a chat subscription; returns `false` if it was already present
    pub async fn subscribe_chat(&self, chat_id: Snowflake) -> bool {
        self.chats.write().await.insert(chat_id)
    }

    pub async fn chats(&self) -> Vec<Snowflake> {
        self.chats.read().await.iter().copied().collect()
    }

    /// Queue a frame, waiting for buffer space
    pub async fn send(&self, message: GatewayMessage) -> Result<(), DeliveryError> {
        self.sender
            .send(Outbound::Frame(message))
            .await
            .map_err(|_| DeliveryError::Closed)
    }

    /// Queue a frame without waiting
    pub fn try_send(&self, message: GatewayMessage) -> Result<(), DeliveryError> {
        self.sender
            .try_send(Outbound::Frame(message))
            .map_err(|e| match e {
                TrySendError::Full(_) => DeliveryError::Backpressure,
                TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }

    /// Stamp the next sequence number on an event and queue it
    pub fn dispatch(&self, event_type: &str, data: Value) -> Result<(), DeliveryError> {
        let seq = self.next_sequence();
        self.try_send(GatewayMessage::dispatch(event_type, seq, data))
    }

    /// Ask the writer to close the socket with `code` after pending frames
    pub fn close(&self, code: CloseCode) {
        match self.sender.try_send(Outbound::Close(code)) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(close)) => {
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let _ = sender.send(close).await;
                });
            }
        }
    }

    /// Tell the client a newer connection took over, then close
    pub fn replace(&self) {
        tracing::info!(session_id = %self.session_id, "Session replaced by a newer connection");

        if let Err(e) = self.try_send(GatewayMessage::invalid_session()) {
            tracing::debug!(session_id = %self.session_id, error = %e, "Could not send InvalidSession");
        }
        self.close(CloseCode::SessionReplaced);
    }
}

#[async_trait]
impl SessionHandle for Connection {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    /// A closing connection refuses pushes so the caller can fall back
    async fn deliver(&self, event: &PubSubEvent) -> Result<(), DeliveryError> {
        match self.state().await {
            ConnectionState::Disconnecting | ConnectionState::Disconnected => {
                Err(DeliveryError::Closed)
            }
            ConnectionState::Connecting | ConnectionState::Connected => {
                self.dispatch(&event.event_type, event.data.clone())
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .finish()
    }
}
