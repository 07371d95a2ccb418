//! Identify handler (op 2)

use super::{HandlerError, HandlerResult};
use crate::connection::Connection;
use crate::events::{GatewayEventType, ReadyEvent};
use crate::protocol::{CloseCode, IdentifyPayload};
use crate::server::GatewayState;
use chat_cache::SessionHandle;
use std::sync::Arc;

/// Handles Identify messages
pub struct IdentifyHandler;

impl IdentifyHandler {
    /// Authenticate the connection and make it the user's live session.
    ///
    /// A session already registered for the user is told it was replaced
    /// and closed.
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: IdentifyPayload,
    ) -> HandlerResult<Option<CloseCode>> {
        if connection.is_authenticated().await {
            tracing::warn!(
                session_id = %connection.session_id(),
                "Client sent Identify while already authenticated"
            );
            return Ok(Some(CloseCode::AlreadyAuthenticated));
        }

        let user_id = state
            .jwt_service()
            .verify_caller(payload.bare_token())
            .map_err(|e| {
                tracing::debug!(error = %e, "Token validation failed");
                HandlerError::AuthenticationFailed(e.to_string())
            })?;

        let user = state
            .service_context()
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| HandlerError::AuthenticationFailed("User not found".to_string()))?;

        let session_id = connection.session_id().to_string();

        state
            .connection_manager()
            .authenticate_connection(&session_id, user_id)
            .await;

        if let Err(e) = state.event_dispatcher().subscribe_user(user_id).await {
            tracing::warn!(user_id = %user_id, error = %e, "Failed to subscribe user channel");
        }

        let handle: Arc<dyn SessionHandle> = connection.clone();
        if let Some(previous) = state.service_context().presence().register(user_id, handle) {
            if previous.session_id() != session_id {
                if let Some(old) = state.connection_manager().get_connection(previous.session_id()) {
                    old.replace();
                }
            }
        }

        let ready = ReadyEvent {
            session_id: session_id.clone(),
            user_id,
        };
        let data = serde_json::to_value(&ready)
            .map_err(|e| HandlerError::Internal(format!("Failed to encode READY: {e}")))?;
        connection.dispatch(GatewayEventType::Ready.as_str(), data)?;

        tracing::info!(
            session_id = %session_id,
            user_id = %user_id,
            name = %user.name,
            "Client identified"
        );

        Ok(None)
    }
}
