//! History limit extractor
//!
//! Reads `?limit=` for endpoints returning a bounded, newest-first series.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;

use crate::response::ApiError;

/// Default number of entries
const DEFAULT_LIMIT: usize = 24;
/// Maximum number of entries
const MAX_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct HistoryLimitParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Validated limit, clamped to 1..=1000
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimit(pub usize);

impl Default for HistoryLimit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

impl From<HistoryLimitParams> for HistoryLimit {
    fn from(params: HistoryLimitParams) -> Self {
        Self(params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for HistoryLimit
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<HistoryLimitParams>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.to_string()))?;

        Ok(params.into())
    }
}
