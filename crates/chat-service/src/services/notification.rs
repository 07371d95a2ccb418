//! Notification router service
//!
//! Chooses between live push and offline persistence for each new message,
//! and owns notification read state.

use chat_cache::{event_types, PubSubEvent};
use chat_core::{DomainError, Message, Notification, NotificationPayload, Snowflake};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// What happened to a message notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Pushed over the receiver's live session, nothing stored
    Delivered,
    /// Stored for later retrieval
    Persisted(Notification),
}

pub struct NotificationRouterService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> NotificationRouterService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Notify the receiver of `message`.
    ///
    /// Online receivers get a live push. If the push fails, or the receiver
    /// is offline, one unread notification is persisted. The live attempt
    /// is never retried.
    #[instrument(skip(self, message), fields(message_id = %message.id, receiver_id = %message.receiver_id))]
    pub async fn route_message_notification(&self, message: &Message) -> ServiceResult<RouteOutcome> {
        let sender = self
            .ctx
            .user_repo()
            .find_by_id(message.sender_id)
            .await?
            .ok_or(DomainError::UserNotFound(message.sender_id))?;
        let payload = NotificationPayload::for_message(&sender.name, message);

        if let Some(session) = self.ctx.presence().get(message.receiver_id) {
            let event = PubSubEvent::from_payload(event_types::NOTIFICATION_CREATE, &payload)
                .map_err(|e| ServiceError::internal(e.to_string()))?;

            match session.deliver(&event).await {
                Ok(()) => {
                    debug!(session_id = session.session_id(), "Notification pushed live");
                    return Ok(RouteOutcome::Delivered);
                }
                Err(e) => {
                    warn!(error = %e, "Live push failed, persisting notification");
                }
            }
        }

        let notification = Notification::new(self.ctx.generate_id(), message.receiver_id, payload);
        self.ctx.notification_repo().create(&notification).await?;

        debug!(notification_id = %notification.id, "Notification persisted");
        Ok(RouteOutcome::Persisted(notification))
    }

    /// Mark a notification read. Idempotent for the recipient.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        notification_id: Snowflake,
        requester: Snowflake,
    ) -> ServiceResult<Notification> {
        let mut notification = self
            .ctx
            .notification_repo()
            .find_by_id(notification_id)
            .await?
            .ok_or(DomainError::NotificationNotFound(notification_id))?;

        if !notification.is_recipient(requester) {
            return Err(DomainError::ForbiddenRecipient {
                notification_id,
                user_id: requester,
            }
            .into());
        }

        if self.ctx.notification_repo().mark_read(notification_id).await? {
            info!(%notification_id, "Notification read");
        }

        notification.is_read = true;
        Ok(notification)
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list_for_user(&self, user_id: Snowflake) -> ServiceResult<Vec<Notification>> {
        Ok(self.ctx.notification_repo().find_by_recipient(user_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn unread_count(&self, user_id: Snowflake) -> ServiceResult<i64> {
        Ok(self.ctx.notification_repo().count_unread(user_id).await?)
    }
}
