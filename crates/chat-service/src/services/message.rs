//! Message pipeline service
//!
//! Persists messages, drives the temporary -> permanent transition and hands
//! each stored message to the notification router and the event publisher.

use chat_core::{Message, Snowflake};
use tracing::{info, instrument, warn};

use super::access::require_participant;
use super::chat::ChatDirectoryService;
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::events::ChatEvents;
use super::notification::NotificationRouterService;

pub struct MessagePipelineService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessagePipelineService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Store a message from `sender` to the other participant.
    ///
    /// Succeeds once the message is stored; lifecycle, notification and
    /// broadcast failures after that are logged only. Terms acceptance is not
    /// required to send.
    #[instrument(skip(self, text))]
    pub async fn send(
        &self,
        chat_id: Snowflake,
        sender: Snowflake,
        text: String,
    ) -> ServiceResult<Message> {
        let access = require_participant(self.ctx, chat_id, sender).await?;
        Message::validate_text(&text)?;

        let draft = Message::new(
            self.ctx.generate_id(),
            chat_id,
            sender,
            access.interlocutor_id()?,
            text,
        );
        let message = self.ctx.message_repo().create(&draft).await?;

        info!(message_id = %message.id, %chat_id, "Message stored");

        // A failed flip leaves the chat temporary; the next send retries it
        let mut chat = access.chat;
        if chat.temporary {
            match ChatDirectoryService::new(self.ctx).mark_permanent(chat_id).await {
                Ok(_) => chat.temporary = false,
                Err(e) => warn!(%chat_id, error = %e, "Failed to mark chat permanent"),
            }
        }

        let events = ChatEvents::new(self.ctx);
        events.message_created(&message).await;

        if let Err(e) = NotificationRouterService::new(self.ctx)
            .route_message_notification(&message)
            .await
        {
            warn!(message_id = %message.id, error = %e, "Notification routing failed");
        }

        events.summaries_updated(&chat).await;

        Ok(message)
    }

    /// Mark every pending message addressed to `reader` as read
    #[instrument(skip(self))]
    pub async fn mark_read(&self, chat_id: Snowflake, reader: Snowflake) -> ServiceResult<u64> {
        let access = require_participant(self.ctx, chat_id, reader).await?;
        let updated = self.ctx.message_repo().mark_read(chat_id, reader).await?;

        if updated > 0 {
            info!(%chat_id, %reader, updated, "Messages marked read");
            ChatEvents::new(self.ctx).summaries_updated(&access.chat).await;
        }

        Ok(updated)
    }

    /// Full history, oldest first
    #[instrument(skip(self))]
    pub async fn list(&self, chat_id: Snowflake, caller: Snowflake) -> ServiceResult<Vec<Message>> {
        require_participant(self.ctx, chat_id, caller).await?;
        Ok(self.ctx.message_repo().find_by_chat(chat_id).await?)
    }

    /// Mark pending messages read, then return the full history
    #[instrument(skip(self))]
    pub async fn read_history(
        &self,
        chat_id: Snowflake,
        caller: Snowflake,
    ) -> ServiceResult<Vec<Message>> {
        self.mark_read(chat_id, caller).await?;
        Ok(self.ctx.message_repo().find_by_chat(chat_id).await?)
    }
}
