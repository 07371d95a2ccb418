//! Chat directory service
//!
//! Resolves the unique chat for a pair of users (and listing), owns the
//! temporary/permanent lifecycle and per-participant terms acceptance, and
//! builds chat summaries.

use chat_core::{Chat, DomainError, ParticipantPair, Snowflake};
use tracing::{debug, info, instrument};

use crate::dto::{ChatSummaryResponse, InterlocutorResponse, TermsStateResponse};

use super::access::require_participant;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub struct ChatDirectoryService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatDirectoryService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Return the chat for `{a, b}` and `listing_id`, creating it if needed.
    ///
    /// New chats start temporary with both participants' terms unaccepted.
    /// Concurrent callers converge on one chat: a lost creation race surfaces
    /// as `ChatAlreadyExists` from the repository and is resolved by reading
    /// the winner's row.
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        a: Snowflake,
        b: Snowflake,
        listing_id: Option<Snowflake>,
    ) -> ServiceResult<Chat> {
        let pair = ParticipantPair::new(a, b)?;

        for user_id in pair.members() {
            if !self.ctx.user_repo().exists(user_id).await? {
                return Err(
                    DomainError::InvalidParticipants(format!("user {user_id} does not exist"))
                        .into(),
                );
            }
        }

        if let Some(listing_id) = listing_id {
            if !self.ctx.listing_repo().exists(listing_id).await? {
                return Err(DomainError::ListingNotFound(listing_id).into());
            }
        }

        if let Some(existing) = self.ctx.chat_repo().find_by_pair(pair, listing_id).await? {
            return Ok(existing);
        }

        let chat = Chat::new(self.ctx.generate_id(), pair, listing_id);

        match self.ctx.chat_repo().create(&chat).await {
            Ok(()) => {
                info!(chat_id = %chat.id, low = %pair.low(), high = %pair.high(), "Chat created");
                Ok(chat)
            }
            Err(DomainError::ChatAlreadyExists) => {
                debug!(low = %pair.low(), high = %pair.high(), "Lost chat creation race, re-resolving");
                self.ctx
                    .chat_repo()
                    .find_by_pair(pair, listing_id)
                    .await?
                    .ok_or_else(|| ServiceError::internal("chat vanished after conflict"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Flip `temporary` to false. Returns whether this call changed it.
    #[instrument(skip(self))]
    pub async fn mark_permanent(&self, chat_id: Snowflake) -> ServiceResult<bool> {
        let changed = self.ctx.chat_repo().mark_permanent(chat_id).await?;
        if changed {
            info!(%chat_id, "Chat became permanent");
        }
        Ok(changed)
    }

    /// Accept the chat terms for the caller only
    #[instrument(skip(self))]
    pub async fn accept_terms(
        &self,
        chat_id: Snowflake,
        caller: Snowflake,
    ) -> ServiceResult<TermsStateResponse> {
        require_participant(self.ctx, chat_id, caller).await?;

        if self.ctx.participant_repo().accept_terms(chat_id, caller).await? {
            info!(%chat_id, user_id = %caller, "Chat terms accepted");
        }

        Ok(TermsStateResponse {
            chat_id: chat_id.to_string(),
            chat_terms_accepted: true,
        })
    }

    #[instrument(skip(self))]
    pub async fn terms_state(
        &self,
        chat_id: Snowflake,
        caller: Snowflake,
    ) -> ServiceResult<TermsStateResponse> {
        let access = require_participant(self.ctx, chat_id, caller).await?;

        Ok(TermsStateResponse {
            chat_id: chat_id.to_string(),
            chat_terms_accepted: access.participant.chat_terms_accepted,
        })
    }

    /// Delete the user's temporary chats that have no messages
    #[instrument(skip(self))]
    pub async fn purge_empty_temporary(&self, user_id: Snowflake) -> ServiceResult<Vec<Snowflake>> {
        let deleted = self.ctx.chat_repo().delete_empty_temporary(user_id).await?;

        if !deleted.is_empty() {
            info!(%user_id, count = deleted.len(), "Purged empty temporary chats");
        }

        Ok(deleted)
    }

    /// Display data of the caller's counterpart in the chat
    #[instrument(skip(self))]
    pub async fn interlocutor(
        &self,
        chat_id: Snowflake,
        caller: Snowflake,
    ) -> ServiceResult<InterlocutorResponse> {
        let access = require_participant(self.ctx, chat_id, caller).await?;
        let other = access.interlocutor_id()?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(other)
            .await?
            .ok_or(DomainError::UserNotFound(other))?;

        Ok(InterlocutorResponse::from(&user))
    }

    /// All chats of `user_id`, most recently active first
    #[instrument(skip(self))]
    pub async fn list_summaries(&self, user_id: Snowflake) -> ServiceResult<Vec<ChatSummaryResponse>> {
        let chats = self.ctx.chat_repo().find_by_user(user_id).await?;

        let mut summaries = Vec::with_capacity(chats.len());
        for chat in &chats {
            summaries.push(self.summary_for(chat, user_id).await?);
        }

        summaries.sort_by_key(|summary| std::cmp::Reverse(summary.last_activity()));
        Ok(summaries)
    }

    /// The chat as `viewer` sees it in their chat list
    pub async fn summary_for(
        &self,
        chat: &Chat,
        viewer: Snowflake,
    ) -> ServiceResult<ChatSummaryResponse> {
        let other = chat.interlocutor_of(viewer).ok_or(DomainError::ForbiddenParticipant {
            chat_id: chat.id,
            user_id: viewer,
        })?;

        let interlocutor = self
            .ctx
            .user_repo()
            .find_by_id(other)
            .await?
            .ok_or(DomainError::UserNotFound(other))?;
        let last_message = self.ctx.message_repo().find_last(chat.id).await?;
        let unread_count = self.ctx.message_repo().count_unread(chat.id, viewer).await?;
        let terms_accepted = self
            .ctx
            .participant_repo()
            .find(chat.id, viewer)
            .await?
            .is_some_and(|participant| participant.chat_terms_accepted);

        Ok(ChatSummaryResponse {
            chat_id: chat.id.to_string(),
            listing_id: chat.listing_id.map(|id| id.to_string()),
            temporary: chat.temporary,
            interlocutor: InterlocutorResponse::from(&interlocutor),
            last_message: last_message.map(Into::into),
            unread_count,
            terms_accepted,
            created_at: chat.created_at,
        })
    }
}
