//! Data transfer objects
//!
//! - Request DTOs with validation for API inputs
//! - Response DTOs shared by REST responses and gateway dispatches
//! - Mappers from domain entities

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::CreateChatRequest;

pub use responses::{
    ChatResponse, ChatSummaryResponse, HealthChecks, HealthResponse, InterlocutorResponse,
    MarkReadResponse, MessageResponse, NotificationResponse, OnlineStatsResponse, PurgeResponse,
    ReadinessResponse, TermsStateResponse, UnreadCountResponse,
};
