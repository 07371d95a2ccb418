//! Handler error types

use crate::protocol::CloseCode;
use chat_cache::DeliveryError;
use chat_core::DomainError;
use thiserror::Error;

/// Errors that end a connection.
///
/// Failures of a single request are answered with `REQUEST_FAILED` instead
/// and never become a `HandlerError`.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Already authenticated")]
    AlreadyAuthenticated,

    #[error("Service error: {0}")]
    ServiceError(#[from] chat_service::ServiceError),

    /// Domain error (from repositories)
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),

    /// The connection's writer is gone
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Convert to a close code (if applicable)
    pub fn to_close_code(&self) -> Option<CloseCode> {
        match self {
            Self::InvalidPayload(_) => Some(CloseCode::DecodeError),
            Self::AuthenticationFailed(_) => Some(CloseCode::AuthenticationFailed),
            Self::NotAuthenticated => Some(CloseCode::NotAuthenticated),
            Self::AlreadyAuthenticated => Some(CloseCode::AlreadyAuthenticated),
            Self::ServiceError(_) | Self::DomainError(_) | Self::Delivery(_) | Self::Internal(_) => {
                Some(CloseCode::UnknownError)
            }
        }
    }
}

pub type HandlerResult<T> = Result<T, HandlerError>;
