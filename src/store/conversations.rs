use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::pagination::{fetch_page, PageParams, Pagination};
use crate::query::Predicate;

/// `message_count` is derived per row; the platform does not store it.
const CONVERSATION_SELECT: &str = "SELECT id, user1_id, user1_username, user2_id, user2_username, \
     started_at, ended_at, status, \
     (SELECT COUNT(*) FROM chat_logs WHERE chat_logs.conversation_id = conversations.id) \
       AS message_count \
     FROM conversations";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Conversation {
    pub id: i64,
    pub user1_id: i64,
    pub user1_username: String,
    pub user2_id: i64,
    pub user2_username: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub status: String,
    pub message_count: i64,
}

#[derive(Clone)]
pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Paged listing with optional status filter and a search matching
    /// either participant's handle.
    pub async fn list(
        &self,
        status: Option<&str>,
        search: Option<&str>,
        params: &PageParams,
    ) -> anyhow::Result<(Vec<Conversation>, Pagination)> {
        let mut predicate = Predicate::new();
        predicate.equals_text("status", status);
        predicate.contains_either("user1_username", "user2_username", search);

        fetch_page(
            &self.pool,
            CONVERSATION_SELECT,
            "FROM conversations",
            &predicate,
            "ORDER BY started_at DESC, id DESC",
            params,
        )
        .await
    }

    pub async fn get(&self, id: i64) -> anyhow::Result<Option<Conversation>> {
        let conversation =
            sqlx::query_as::<_, Conversation>(&format!("{CONVERSATION_SELECT} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(conversation)
    }

    /// Page of conversations where the user is either participant.
    pub async fn for_user(
        &self,
        user_id: i64,
        params: &PageParams,
    ) -> anyhow::Result<(Vec<Conversation>, Pagination)> {
        let mut predicate = Predicate::new();
        predicate.equals_either("user1_id", "user2_id", Some(user_id));

        fetch_page(
            &self.pool,
            CONVERSATION_SELECT,
            "FROM conversations",
            &predicate,
            "ORDER BY started_at DESC, id DESC",
            params,
        )
        .await
    }

    pub async fn recent_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> anyhow::Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(&format!(
            "{CONVERSATION_SELECT} WHERE user1_id = ?1 OR user2_id = ?1 \
             ORDER BY started_at DESC, id DESC LIMIT ?2"
        ))
        .bind(user_id)
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;
        Ok(conversations)
    }

    /// Globally most recent conversations, newest first.
    pub async fn recent(&self, limit: i64) -> anyhow::Result<Vec<Conversation>> {
        let conversations = sqlx::query_as::<_, Conversation>(&format!(
            "{CONVERSATION_SELECT} ORDER BY started_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;
        Ok(conversations)
    }
}
