//! Notification handlers
//!
//! Stored notifications of the caller.

use axum::{
    extract::{Path, State},
    Json,
};
use chat_service::{NotificationResponse, NotificationRouterService, UnreadCountResponse};

use crate::extractors::{AuthUser, NotificationIdPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Newest first
///
/// GET /notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<NotificationResponse>>> {
    let notifications = NotificationRouterService::new(state.service_context())
        .list_for_user(auth.user_id)
        .await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

/// GET /notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UnreadCountResponse>> {
    let count = NotificationRouterService::new(state.service_context())
        .unread_count(auth.user_id)
        .await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// POST /notifications/{notification_id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<NotificationIdPath>,
) -> ApiResult<Json<NotificationResponse>> {
    let notification = NotificationRouterService::new(state.service_context())
        .mark_read(path.notification_id()?, auth.user_id)
        .await?;
    Ok(Json(notification.into()))
}
