//! PostgreSQL implementation of ChatRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use chat_core::entities::Chat;
use chat_core::error::DomainError;
use chat_core::traits::{ChatRepository, RepoResult};
use chat_core::value_objects::{ParticipantPair, Snowflake};

use crate::mappers::ChatInsert;
use crate::models::ChatModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of ChatRepository
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    /// Create a new PgChatRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_chats(rows: Vec<ChatModel>) -> RepoResult<Vec<Chat>> {
    rows.into_iter().map(Chat::try_from).collect()
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Chat>> {
        let result = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, user_low, user_high, listing_id, temporary, created_at
            FROM chats
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Chat::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_pair(
        &self,
        pair: ParticipantPair,
        listing_id: Option<Snowflake>,
    ) -> RepoResult<Option<Chat>> {
        let result = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, user_low, user_high, listing_id, temporary, created_at
            FROM chats
            WHERE user_low = $1
              AND user_high = $2
              AND listing_id IS NOT DISTINCT FROM $3
            ",
        )
        .bind(pair.low().into_inner())
        .bind(pair.high().into_inner())
        .bind(listing_id.map(Snowflake::into_inner))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Chat::try_from).transpose()
    }

    #[instrument(skip(self, chat), fields(chat_id = %chat.id))]
    async fn create(&self, chat: &Chat) -> RepoResult<()> {
        let insert = ChatInsert::new(chat);
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO chats (id, user_low, user_high, listing_id, temporary, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(insert.id)
        .bind(insert.user_low)
        .bind(insert.user_high)
        .bind(insert.listing_id)
        .bind(insert.temporary)
        .bind(insert.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ChatAlreadyExists))?;

        sqlx::query(
            r"
            INSERT INTO chat_participants (chat_id, user_id, chat_terms_accepted)
            VALUES ($1, $2, FALSE), ($1, $3, FALSE)
            ",
        )
        .bind(insert.id)
        .bind(insert.user_low)
        .bind(insert.user_high)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Chat>> {
        let rows = sqlx::query_as::<_, ChatModel>(
            r"
            SELECT id, user_low, user_high, listing_id, temporary, created_at
            FROM chats
            WHERE user_low = $1 OR user_high = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        to_chats(rows)
    }

    #[instrument(skip(self))]
    async fn mark_permanent(&self, id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE chats SET temporary = FALSE WHERE id = $1 AND temporary
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_empty_temporary(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Row locks conflict with the key-share lock a message insert takes on
        // its chat, so a send in flight either commits first (and is seen by
        // the re-check below) or fails on the deleted chat.
        let candidates = sqlx::query_scalar::<_, i64>(
            r"
            SELECT id FROM chats
            WHERE (user_low = $1 OR user_high = $1) AND temporary
            FOR UPDATE
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if candidates.is_empty() {
            tx.commit().await.map_err(map_db_error)?;
            return Ok(Vec::new());
        }

        let deleted = sqlx::query_scalar::<_, i64>(
            r"
            DELETE FROM chats c
            WHERE c.id = ANY($1)
              AND c.temporary
              AND NOT EXISTS (SELECT 1 FROM messages m WHERE m.chat_id = c.id)
            RETURNING c.id
            ",
        )
        .bind(&candidates)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        debug!(candidates = candidates.len(), deleted = deleted.len(), "Purged temporary chats");
        Ok(deleted.into_iter().map(Snowflake::new).collect())
    }
}
