//! # chat-service
//!
//! Application layer: chat directory, message pipeline and notification
//! router, plus the DTOs shared by the REST API and the gateway.

pub mod dto;
pub mod services;

pub use services::{
    require_participant, ChatAccess, ChatDirectoryService, ChatEvents, MessagePipelineService,
    NotificationRouterService, RouteOutcome, ServiceContext, ServiceContextBuilder, ServiceError,
    ServiceResult,
};

pub use dto::{
    ChatResponse, ChatSummaryResponse, CreateChatRequest, HealthResponse, InterlocutorResponse,
    MarkReadResponse, MessageResponse, NotificationResponse, OnlineStatsResponse, PurgeResponse,
    ReadinessResponse, TermsStateResponse, UnreadCountResponse,
};
