//! Presence registry.
//!
//! Maps a user to at most one live session. The map is sharded
//! (`DashMap`), so connects and disconnects of unrelated users never contend
//! on one lock, and no shard guard is held across an `.await`.

use crate::pubsub::PubSubEvent;
use async_trait::async_trait;
use chat_core::Snowflake;
use dashmap::DashMap;
use std::sync::Arc;

/// Failure to push an event over a live session
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("session is closed")]
    Closed,

    #[error("session send buffer is full")]
    Backpressure,

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A live connection as seen by the rest of the system.
///
/// Implemented by the gateway connection; tests provide their own.
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Unique id of the session, used to detect stale disconnects
    fn session_id(&self) -> &str;

    /// Push an event to the client
    async fn deliver(&self, event: &PubSubEvent) -> Result<(), DeliveryError>;
}

/// User id -> live session
#[derive(Default)]
pub struct PresenceRegistry {
    sessions: DashMap<Snowflake, Arc<dyn SessionHandle>>,
}

pub type SharedPresenceRegistry = Arc<PresenceRegistry>;

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `handle` the user's active session.
    ///
    /// Last connect wins. The replaced handle is returned so the caller can
    /// close it; the registry never closes connections itself.
    pub fn register(
        &self,
        user_id: Snowflake,
        handle: Arc<dyn SessionHandle>,
    ) -> Option<Arc<dyn SessionHandle>> {
        let session_id = handle.session_id().to_string();
        let previous = self.sessions.insert(user_id, handle);

        tracing::debug!(
            %user_id,
            %session_id,
            replaced = previous.is_some(),
            "Presence registered"
        );

        previous
    }

    /// Remove the mapping only if it still points at `session_id`.
    ///
    /// Returns `false` when a newer session has taken over.
    pub fn unregister(&self, user_id: Snowflake, session_id: &str) -> bool {
        let removed = self
            .sessions
            .remove_if(&user_id, |_, handle| handle.session_id() == session_id)
            .is_some();

        if removed {
            tracing::debug!(%user_id, %session_id, "Presence unregistered");
        } else {
            tracing::trace!(%user_id, %session_id, "Stale unregister ignored");
        }

        removed
    }

    #[must_use]
    pub fn is_online(&self, user_id: Snowflake) -> bool {
        self.sessions.contains_key(&user_id)
    }

    /// Clone out the user's session handle
    #[must_use]
    pub fn get(&self, user_id: Snowflake) -> Option<Arc<dyn SessionHandle>> {
        self.sessions.get(&user_id).map(|entry| Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn online_count(&self) -> usize {
        self.sessions.len()
    }
}

impl std::fmt::Debug for PresenceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceRegistry")
            .field("online", &self.sessions.len())
            .finish()
    }
}
