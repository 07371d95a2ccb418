//! # chat-db
//!
//! PostgreSQL implementations of the chat-core repository traits via SQLx.
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations
//!
//! ```rust,ignore
//! use chat_db::{create_pool, run_migrations, PgChatRepository, PoolConfig};
//!
//! let pool = create_pool(&PoolConfig::from(&config.database)).await?;
//! run_migrations(&pool).await?;
//! let chats = PgChatRepository::new(pool.clone());
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgChatRepository, PgListingRepository, PgMessageRepository, PgNotificationRepository,
    PgParticipantRepository, PgUserRepository,
};
