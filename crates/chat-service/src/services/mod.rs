//! Business logic services

pub mod access;
pub mod chat;
pub mod context;
pub mod error;
pub mod events;
pub mod message;
pub mod notification;

pub use access::{require_participant, ChatAccess};
pub use chat::ChatDirectoryService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use events::ChatEvents;
pub use message::MessagePipelineService;
pub use notification::{NotificationRouterService, RouteOutcome};
