//! Connection manager
//!
//! Tracks the connections of this gateway instance and which of them listen
//! to each user and chat topic. No map guard is held across an `.await`.

use super::{Connection, ConnectionState, Outbound};
use chat_core::Snowflake;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// What a removal left behind, so the caller can drop Pub/Sub subscriptions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Removal {
    pub user_id: Option<Snowflake>,
    /// The user has no other connection on this instance
    pub user_vacated: bool,
    /// Chats with no remaining local subscriber
    pub vacated_chats: Vec<Snowflake>,
}

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    /// Active connections by session ID
    connections: DashMap<String, Arc<Connection>>,

    /// User ID to session IDs mapping
    user_connections: DashMap<Snowflake, HashSet<String>>,

    /// Chat ID to session IDs mapping
    chat_connections: DashMap<Snowflake, HashSet<String>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_connections: DashMap::new(),
            chat_connections: DashMap::new(),
        }
    }

    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection
    pub fn add_connection(&self, session_id: String, sender: mpsc::Sender<Outbound>) -> Arc<Connection> {
        let connection = Connection::new(session_id.clone(), sender);
        self.connections.insert(session_id.clone(), connection.clone());

        tracing::debug!(session_id = %session_id, "Connection added");

        connection
    }

    /// Remove a connection and its topic memberships
    pub async fn remove_connection(&self, session_id: &str) -> Removal {
        let Some((_, connection)) = self.connections.remove(session_id) else {
            return Removal::default();
        };

        let mut removal = Removal::default();

        if let Some(user_id) = connection.user_id().await {
            removal.user_id = Some(user_id);
            removal.user_vacated = Self::leave(&self.user_connections, user_id, session_id);
        }

        for chat_id in connection.chats().await {
            if Self::leave(&self.chat_connections, chat_id, session_id) {
                removal.vacated_chats.push(chat_id);
            }
        }

        tracing::debug!(session_id = %session_id, "Connection removed");

        removal
    }

    /// Remove `session_id` from a topic; true if the topic became empty
    fn leave(map: &DashMap<Snowflake, HashSet<String>>, key: Snowflake, session_id: &str) -> bool {
        if let Some(mut sessions) = map.get_mut(&key) {
            sessions.remove(session_id);
        }
        map.remove_if(&key, |_, sessions| sessions.is_empty()).is_some()
    }

    pub fn get_connection(&self, session_id: &str) -> Option<Arc<Connection>> {
        self.connections.get(session_id).map(|r| r.clone())
    }

    /// Link a connection to its user
    pub async fn authenticate_connection(&self, session_id: &str, user_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        connection.set_user_id(user_id).await;
        connection.set_state(ConnectionState::Connected).await;

        self.user_connections
            .entry(user_id)
            .or_default()
            .insert(session_id.to_string());

        tracing::debug!(session_id = %session_id, user_id = %user_id, "Connection authenticated");

        true
    }

    /// Subscribe a connection to a chat topic.
    ///
    /// Returns `true` when this is the first local subscriber of the chat.
    pub async fn subscribe_to_chat(&self, session_id: &str, chat_id: Snowflake) -> bool {
        let Some(connection) = self.get_connection(session_id) else {
            return false;
        };

        if !connection.subscribe_chat(chat_id).await {
            return false;
        }

        let mut sessions = self.chat_connections.entry(chat_id).or_default();
        let first = sessions.is_empty();
        sessions.insert(session_id.to_string());

        tracing::trace!(session_id = %session_id, chat_id = %chat_id, first, "Connection subscribed to chat");

        first
    }

    fn collect(&self, map: &DashMap<Snowflake, HashSet<String>>, key: Snowflake) -> Vec<Arc<Connection>> {
        let session_ids: Vec<String> = map
            .get(&key)
            .map(|sessions| sessions.iter().cloned().collect())
            .unwrap_or_default();

        session_ids
            .iter()
            .filter_map(|sid| self.get_connection(sid))
            .collect()
    }

    pub fn get_user_connections(&self, user_id: Snowflake) -> Vec<Arc<Connection>> {
        self.collect(&self.user_connections, user_id)
    }

    pub fn get_chat_connections(&self, chat_id: Snowflake) -> Vec<Arc<Connection>> {
        self.collect(&self.chat_connections, chat_id)
    }

    /// Dispatch an event to all connections of a user
    pub fn send_to_user(&self, user_id: Snowflake, event_type: &str, data: &Value) -> usize {
        Self::dispatch_all(self.get_user_connections(user_id), event_type, data)
    }

    /// Dispatch an event to all connections subscribed to a chat
    pub fn send_to_chat(&self, chat_id: Snowflake, event_type: &str, data: &Value) -> usize {
        Self::dispatch_all(self.get_chat_connections(chat_id), event_type, data)
    }

    fn dispatch_all(connections: Vec<Arc<Connection>>, event_type: &str, data: &Value) -> usize {
        let mut sent = 0;

        for conn in connections {
            match conn.dispatch(event_type, data.clone()) {
                Ok(()) => sent += 1,
                Err(e) => tracing::debug!(
                    session_id = %conn.session_id(),
                    event_type,
                    error = %e,
                    "Dropped event for connection"
                ),
            }
        }

        sent
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether the user has an authenticated connection here
    #[must_use]
    pub fn has_user(&self, user_id: Snowflake) -> bool {
        self.user_connections.contains_key(&user_id)
    }

    /// Whether any local connection listens to the chat
    #[must_use]
    pub fn has_chat_listeners(&self, chat_id: Snowflake) -> bool {
        self.chat_connections.contains_key(&chat_id)
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .field("users", &self.user_connections.len())
            .field("chats", &self.chat_connections.len())
            .finish()
    }
}
