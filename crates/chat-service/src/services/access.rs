//! Chat membership guard
//!
//! Every chat-scoped operation goes through [`require_participant`] before
//! touching messages or chat state.

use chat_core::{Chat, DomainError, Participant, Snowflake};
use tracing::{instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A chat together with the caller's membership record
#[derive(Debug, Clone)]
pub struct ChatAccess {
    pub chat: Chat,
    pub participant: Participant,
}

impl ChatAccess {
    /// The other member of the chat.
    ///
    /// # Errors
    /// `Internal` if the chat does not pair the caller with a distinct user.
    pub fn interlocutor_id(&self) -> ServiceResult<Snowflake> {
        let caller = self.participant.user_id;
        match self.chat.interlocutor_of(caller) {
            Some(other) if other != caller => Ok(other),
            _ => Err(ServiceError::internal(format!(
                "chat {} has no counterpart for {caller}",
                self.chat.id
            ))),
        }
    }
}

/// Resolve `chat_id` and verify `caller` is one of its two participants.
///
/// # Errors
/// `ChatNotFound` if the chat does not exist, `ForbiddenParticipant` if the
/// caller holds no participant record for it.
#[instrument(skip(ctx))]
pub async fn require_participant(
    ctx: &ServiceContext,
    chat_id: Snowflake,
    caller: Snowflake,
) -> ServiceResult<ChatAccess> {
    let chat = ctx
        .chat_repo()
        .find_by_id(chat_id)
        .await?
        .ok_or(DomainError::ChatNotFound(chat_id))?;

    let forbidden = || DomainError::ForbiddenParticipant {
        chat_id,
        user_id: caller,
    };

    if !chat.has_member(caller) {
        warn!(%chat_id, %caller, "Rejected non-participant");
        return Err(forbidden().into());
    }

    let participant = ctx
        .participant_repo()
        .find(chat_id, caller)
        .await?
        .ok_or_else(forbidden)?;

    Ok(ChatAccess { chat, participant })
}
