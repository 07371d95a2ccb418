//! Service context - dependency container for services
//!
//! Holds repositories, the event publisher, the presence registry and the id
//! generator. Everything is behind a trait object so services run unchanged
//! against PostgreSQL/Redis or in-memory fakes.

use std::sync::Arc;

use chat_cache::{EventPublisher, Publisher, SharedPresenceRegistry, SharedRedisPool};
use chat_core::traits::{
    ChatRepository, ListingRepository, MessageRepository, NotificationRepository,
    ParticipantRepository, UserRepository,
};
use chat_core::{Snowflake, SnowflakeGenerator};
use chat_db::{
    PgChatRepository, PgListingRepository, PgMessageRepository, PgNotificationRepository,
    PgParticipantRepository, PgPool, PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    listing_repo: Arc<dyn ListingRepository>,
    chat_repo: Arc<dyn ChatRepository>,
    participant_repo: Arc<dyn ParticipantRepository>,
    message_repo: Arc<dyn MessageRepository>,
    notification_repo: Arc<dyn NotificationRepository>,

    // Delivery
    publisher: Arc<dyn EventPublisher>,
    presence: SharedPresenceRegistry,

    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Wire the PostgreSQL repositories and the Redis publisher
    #[must_use]
    pub fn from_infrastructure(
        pool: PgPool,
        redis_pool: &SharedRedisPool,
        presence: SharedPresenceRegistry,
        snowflake_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            user_repo: Arc::new(PgUserRepository::new(pool.clone())),
            listing_repo: Arc::new(PgListingRepository::new(pool.clone())),
            chat_repo: Arc::new(PgChatRepository::new(pool.clone())),
            participant_repo: Arc::new(PgParticipantRepository::new(pool.clone())),
            message_repo: Arc::new(PgMessageRepository::new(pool.clone())),
            notification_repo: Arc::new(PgNotificationRepository::new(pool)),
            publisher: Arc::new(Publisher::new(redis_pool.as_ref().clone())),
            presence,
            snowflake_generator,
        }
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn listing_repo(&self) -> &dyn ListingRepository {
        self.listing_repo.as_ref()
    }

    pub fn chat_repo(&self) -> &dyn ChatRepository {
        self.chat_repo.as_ref()
    }

    pub fn participant_repo(&self) -> &dyn ParticipantRepository {
        self.participant_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn notification_repo(&self) -> &dyn NotificationRepository {
        self.notification_repo.as_ref()
    }

    // === Delivery ===

    /// Cross-instance event publisher
    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Live sessions on this instance
    pub fn presence(&self) -> &SharedPresenceRegistry {
        &self.presence
    }

    // === Ids ===

    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("presence", &self.presence)
            .field("repositories", &"...")
            .finish_non_exhaustive()
    }
}

/// Builder for assembling a `ServiceContext` from individual parts
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    listing_repo: Option<Arc<dyn ListingRepository>>,
    chat_repo: Option<Arc<dyn ChatRepository>>,
    participant_repo: Option<Arc<dyn ParticipantRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    notification_repo: Option<Arc<dyn NotificationRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    presence: Option<SharedPresenceRegistry>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn listing_repo(mut self, repo: Arc<dyn ListingRepository>) -> Self {
        self.listing_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn chat_repo(mut self, repo: Arc<dyn ChatRepository>) -> Self {
        self.chat_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn participant_repo(mut self, repo: Arc<dyn ParticipantRepository>) -> Self {
        self.participant_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn notification_repo(mut self, repo: Arc<dyn NotificationRepository>) -> Self {
        self.notification_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    #[must_use]
    pub fn presence(mut self, presence: SharedPresenceRegistry) -> Self {
        self.presence = Some(presence);
        self
    }

    #[must_use]
    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the `ServiceContext`
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            listing_repo: required(self.listing_repo, "listing_repo")?,
            chat_repo: required(self.chat_repo, "chat_repo")?,
            participant_repo: required(self.participant_repo, "participant_repo")?,
            message_repo: required(self.message_repo, "message_repo")?,
            notification_repo: required(self.notification_repo, "notification_repo")?,
            publisher: required(self.publisher, "publisher")?,
            presence: required(self.presence, "presence")?,
            snowflake_generator: required(self.snowflake_generator, "snowflake_generator")?,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{name} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_reports_missing_dependency() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: user_repo is required");
    }
}
