//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::Message;
use chat_core::error::DomainError;
use chat_core::traits::{MessageRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::{map_db_error, map_foreign_key_violation};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self, message), fields(message_id = %message.id, chat_id = %message.chat_id))]
    async fn create(&self, message: &Message) -> RepoResult<Message> {
        let insert = MessageInsert::new(message);

        // GREATEST ignores NULL, so the first message keeps its own timestamp.
        let stored = sqlx::query_as::<_, MessageModel>(
            r"
            INSERT INTO messages (id, chat_id, sender_id, receiver_id, text, sent_at, is_read)
            VALUES (
                $1, $2, $3, $4, $5,
                GREATEST($6, (SELECT MAX(sent_at) FROM messages WHERE chat_id = $2)),
                FALSE
            )
            RETURNING id, chat_id, sender_id, receiver_id, text, sent_at, is_read
            ",
        )
        .bind(insert.id)
        .bind(insert.chat_id)
        .bind(insert.sender_id)
        .bind(insert.receiver_id)
        .bind(insert.text)
        .bind(insert.sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_foreign_key_violation(e, || DomainError::ChatNotFound(message.chat_id)))?;

        Ok(Message::from(stored))
    }

    #[instrument(skip(self))]
    async fn find_by_chat(&self, chat_id: Snowflake) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, chat_id, sender_id, receiver_id, text, sent_at, is_read
            FROM messages
            WHERE chat_id = $1
            ORDER BY sent_at ASC, id ASC
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_last(&self, chat_id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, chat_id, sender_id, receiver_id, text, sent_at, is_read
            FROM messages
            WHERE chat_id = $1
            ORDER BY sent_at DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(chat_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, chat_id: Snowflake, reader_id: Snowflake) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE messages
            SET is_read = TRUE
            WHERE chat_id = $1 AND receiver_id = $2 AND NOT is_read
            ",
        )
        .bind(chat_id.into_inner())
        .bind(reader_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn count_unread(&self, chat_id: Snowflake, reader_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM messages
            WHERE chat_id = $1 AND receiver_id = $2 AND NOT is_read
            ",
        )
        .bind(chat_id.into_inner())
        .bind(reader_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
