//! Online statistics
//!
//! Snapshots are recorded by the gateway; this endpoint only reads them.

use axum::{extract::State, Json};
use chat_service::OnlineStatsResponse;

use crate::extractors::{AuthUser, HistoryLimit};
use crate::response::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /stats/online
pub async fn online_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
    HistoryLimit(limit): HistoryLimit,
) -> ApiResult<Json<OnlineStatsResponse>> {
    let store = state.online_stats();

    let current = store.latest().await.map_err(ApiError::internal)?;
    let history = store.history(limit).await.map_err(ApiError::internal)?;

    Ok(Json(OnlineStatsResponse { current, history }))
}
