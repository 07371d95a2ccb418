//! Chat handlers
//!
//! Chat directory and per-chat message endpoints for the caller.

use axum::{
    extract::{Path, State},
    Json,
};
use chat_service::{
    ChatDirectoryService, ChatResponse, ChatSummaryResponse, CreateChatRequest,
    InterlocutorResponse, MarkReadResponse, MessagePipelineService, MessageResponse,
    PurgeResponse, TermsStateResponse,
};

use crate::extractors::{AuthUser, ChatIdPath, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Open the chat between the caller and a seller
///
/// POST /chats
pub async fn create_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let chat = ChatDirectoryService::new(state.service_context())
        .get_or_create(auth.user_id, request.seller_id, request.listing_id)
        .await?;
    Ok(Json(chat.into()))
}

/// Caller's chats, most recent activity first
///
/// GET /chats
pub async fn list_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<ChatSummaryResponse>>> {
    let summaries = ChatDirectoryService::new(state.service_context())
        .list_summaries(auth.user_id)
        .await?;
    Ok(Json(summaries))
}

/// DELETE /chats/temporary
pub async fn purge_temporary_chats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<PurgeResponse>> {
    let deleted = ChatDirectoryService::new(state.service_context())
        .purge_empty_temporary(auth.user_id)
        .await?;
    Ok(Json(PurgeResponse {
        deleted: deleted.len(),
    }))
}

/// Full history; the caller's pending messages are marked read first
///
/// GET /chats/{chat_id}/messages
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
) -> ApiResult<Json<Vec<MessageResponse>>> {
    let messages = MessagePipelineService::new(state.service_context())
        .read_history(path.chat_id()?, auth.user_id)
        .await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

/// POST /chats/{chat_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
) -> ApiResult<Json<MarkReadResponse>> {
    let updated = MessagePipelineService::new(state.service_context())
        .mark_read(path.chat_id()?, auth.user_id)
        .await?;
    Ok(Json(MarkReadResponse { updated }))
}

/// GET /chats/{chat_id}/terms
pub async fn get_terms(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
) -> ApiResult<Json<TermsStateResponse>> {
    let terms = ChatDirectoryService::new(state.service_context())
        .terms_state(path.chat_id()?, auth.user_id)
        .await?;
    Ok(Json(terms))
}

/// Accept the terms for the caller only
///
/// POST /chats/{chat_id}/terms
pub async fn accept_terms(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
) -> ApiResult<Json<TermsStateResponse>> {
    let terms = ChatDirectoryService::new(state.service_context())
        .accept_terms(path.chat_id()?, auth.user_id)
        .await?;
    Ok(Json(terms))
}

/// GET /chats/{chat_id}/interlocutor
pub async fn get_interlocutor(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<ChatIdPath>,
) -> ApiResult<Json<InterlocutorResponse>> {
    let interlocutor = ChatDirectoryService::new(state.service_context())
        .interlocutor(path.chat_id()?, auth.user_id)
        .await?;
    Ok(Json(interlocutor))
}
