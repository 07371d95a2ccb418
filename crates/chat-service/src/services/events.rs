//! Outbound chat events
//!
//! Publishing is fire-and-forget: a failed publish is logged and never fails
//! the operation that produced it.

use chat_cache::{event_types, PubSubChannel, PubSubEvent};
use chat_core::{Chat, Message};
use serde::Serialize;
use tracing::{debug, warn};

use crate::dto::MessageResponse;

use super::chat::ChatDirectoryService;
use super::context::ServiceContext;

pub struct ChatEvents<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatEvents<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// `MESSAGE_CREATE` to everyone subscribed to the chat topic
    pub async fn message_created(&self, message: &Message) {
        self.publish(
            &PubSubChannel::chat(message.chat_id),
            event_types::MESSAGE_CREATE,
            &MessageResponse::from(message),
        )
        .await;
    }

    /// `CHAT_SUMMARY_UPDATE` to both participants, each with their own view
    pub async fn summaries_updated(&self, chat: &Chat) {
        let directory = ChatDirectoryService::new(self.ctx);

        for member in chat.participants.members() {
            match directory.summary_for(chat, member).await {
                Ok(summary) => {
                    self.publish(
                        &PubSubChannel::user(member),
                        event_types::CHAT_SUMMARY_UPDATE,
                        &summary,
                    )
                    .await;
                }
                Err(e) => {
                    warn!(chat_id = %chat.id, user_id = %member, error = %e, "Failed to build chat summary");
                }
            }
        }
    }

    async fn publish<T: Serialize>(&self, channel: &PubSubChannel, event_type: &str, payload: &T) {
        let event = match PubSubEvent::from_payload(event_type, payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(%channel, event_type, error = %e, "Failed to encode event");
                return;
            }
        };

        match self.ctx.publisher().publish(channel, &event).await {
            Ok(receivers) => debug!(%channel, event_type, receivers, "Event published"),
            Err(e) => warn!(%channel, event_type, error = %e, "Failed to publish event"),
        }
    }
}
