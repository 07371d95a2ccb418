//! Request handler (op 3)
//!
//! Runs one client operation and answers it with a single dispatch. Chat
//! scoped operations pass the participant guard before anything else,
//! including the chat topic subscription.

use super::HandlerResult;
use crate::connection::Connection;
use crate::events::{
    ChatHistoryEvent, ChatListEvent, GatewayEventType, MessagesReadEvent, RequestFailedEvent,
    RequestReply,
};
use crate::protocol::{ClientOperation, ClientRequest, CloseCode, GatewayMessage};
use crate::server::GatewayState;
use chat_core::Snowflake;
use chat_service::dto::MessageResponse;
use chat_service::{
    require_participant, ChatDirectoryService, MessagePipelineService, ServiceError, ServiceResult,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Handles Request messages
pub struct RequestHandler;

impl RequestHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        request: ClientRequest,
    ) -> HandlerResult<Option<CloseCode>> {
        let Some(caller) = connection.user_id().await else {
            tracing::debug!(
                session_id = %connection.session_id(),
                "Request before Identify"
            );
            return Ok(Some(CloseCode::NotAuthenticated));
        };

        let ClientRequest { nonce, operation } = request;
        let operation_name = operation.name();

        let reply = match Self::execute(state, connection, caller, operation).await {
            Ok((event, data)) => Self::encode(event, &RequestReply::new(nonce, data)),
            Err(e) => {
                tracing::info!(
                    session_id = %connection.session_id(),
                    user_id = %caller,
                    operation = operation_name,
                    error = %e,
                    "Request failed"
                );
                Self::encode(GatewayEventType::RequestFailed, &Self::failure(nonce, &e))
            }
        };

        let (event, data) = match reply {
            Ok(encoded) => encoded,
            Err(e) => {
                let fallback = Self::failure(None, &e);
                (
                    GatewayEventType::RequestFailed,
                    serde_json::json!({ "code": fallback.code, "message": fallback.message }),
                )
            }
        };

        let seq = connection.next_sequence();
        connection
            .send(GatewayMessage::dispatch(event.as_str(), seq, data))
            .await?;

        Ok(None)
    }

    /// Answer an undecodable request without closing the connection
    pub async fn reject_malformed(
        connection: &Arc<Connection>,
        payload: Option<&Value>,
    ) -> HandlerResult<Option<CloseCode>> {
        if !connection.is_authenticated().await {
            return Ok(Some(CloseCode::NotAuthenticated));
        }

        let nonce = payload
            .and_then(|d| d.get("nonce"))
            .and_then(Value::as_str)
            .map(str::to_string);

        tracing::debug!(session_id = %connection.session_id(), "Malformed request");

        let failed = RequestFailedEvent {
            nonce,
            code: "INVALID_REQUEST".to_string(),
            message: "Unknown or malformed request".to_string(),
        };
        let data = serde_json::to_value(&failed).unwrap_or(Value::Null);

        let seq = connection.next_sequence();
        connection
            .send(GatewayMessage::dispatch(
                GatewayEventType::RequestFailed.as_str(),
                seq,
                data,
            ))
            .await?;

        Ok(None)
    }

    async fn execute(
        state: &GatewayState,
        connection: &Arc<Connection>,
        caller: Snowflake,
        operation: ClientOperation,
    ) -> ServiceResult<(GatewayEventType, Value)> {
        let ctx = state.service_context();

        if let Some(chat_id) = operation.chat_id() {
            require_participant(ctx, chat_id, caller).await?;
            Self::subscribe(state, connection, chat_id).await;
        }

        match operation {
            ClientOperation::SendMessage { chat_id, text } => {
                let message = MessagePipelineService::new(ctx)
                    .send(chat_id, caller, text)
                    .await?;
                Self::encode(GatewayEventType::MessageSent, &MessageResponse::from(&message))
            }
            ClientOperation::LoadHistory { chat_id } => {
                let messages = MessagePipelineService::new(ctx).list(chat_id, caller).await?;
                let history = ChatHistoryEvent {
                    chat_id,
                    messages: messages.iter().map(MessageResponse::from).collect(),
                };
                Self::encode(GatewayEventType::ChatHistory, &history)
            }
            ClientOperation::MarkRead { chat_id } => {
                let updated = MessagePipelineService::new(ctx)
                    .mark_read(chat_id, caller)
                    .await?;
                Self::encode(
                    GatewayEventType::MessagesRead,
                    &MessagesReadEvent { chat_id, updated },
                )
            }
            ClientOperation::ListChats => {
                let chats = ChatDirectoryService::new(ctx).list_summaries(caller).await?;
                for chat_id in chats.iter().filter_map(|s| Snowflake::parse(&s.chat_id).ok()) {
                    Self::subscribe(state, connection, chat_id).await;
                }
                Self::encode(GatewayEventType::ChatList, &ChatListEvent { chats })
            }
            ClientOperation::FetchInterlocutor { chat_id } => {
                let info = ChatDirectoryService::new(ctx)
                    .interlocutor(chat_id, caller)
                    .await?;
                Self::encode(GatewayEventType::InterlocutorInfo, &info)
            }
        }
    }

    /// Start receiving `MESSAGE_CREATE` for the chat on this connection
    async fn subscribe(state: &GatewayState, connection: &Arc<Connection>, chat_id: Snowflake) {
        let first_local = state
            .connection_manager()
            .subscribe_to_chat(connection.session_id(), chat_id)
            .await;

        if first_local {
            if let Err(e) = state.event_dispatcher().subscribe_chat(chat_id).await {
                tracing::warn!(chat_id = %chat_id, error = %e, "Failed to subscribe chat channel");
            }
        }
    }

    fn encode<T: Serialize>(
        event: GatewayEventType,
        payload: &T,
    ) -> ServiceResult<(GatewayEventType, Value)> {
        let value = serde_json::to_value(payload)
            .map_err(|e| ServiceError::internal(format!("Failed to encode {event}: {e}")))?;
        Ok((event, value))
    }

    /// Client-facing failure; server-side details are not exposed
    fn failure(nonce: Option<String>, error: &ServiceError) -> RequestFailedEvent {
        let message = if error.status_code() >= 500 {
            "Internal error".to_string()
        } else {
            error.to_string()
        };

        RequestFailedEvent {
            nonce,
            code: error.error_code().to_string(),
            message,
        }
    }
}
