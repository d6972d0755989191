use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::pagination::{fetch_page, PageParams, Pagination};
use crate::query::Predicate;

const MESSAGE_SELECT: &str = "SELECT id, conversation_id, sender_id, sender_username, \
     receiver_id, receiver_username, message, timestamp \
     FROM chat_logs";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_id: i64,
    pub receiver_username: String,
    pub message: String,
    pub timestamp: String,
}

/// Optional filters for the message listing, applied in declaration order.
#[derive(Debug, Default)]
pub struct MessageFilters<'a> {
    pub conversation_id: Option<i64>,
    pub user_id: Option<i64>,
    pub search: Option<&'a str>,
    pub date_from: Option<&'a str>,
    pub date_to: Option<&'a str>,
}

#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filters: &MessageFilters<'_>,
        params: &PageParams,
    ) -> anyhow::Result<(Vec<Message>, Pagination)> {
        let mut predicate = Predicate::new();
        predicate.equals_int("conversation_id", filters.conversation_id);
        predicate.equals_either("sender_id", "receiver_id", filters.user_id);
        predicate.contains("message", filters.search);
        predicate.at_least("timestamp", filters.date_from);
        predicate.at_most("timestamp", filters.date_to);

        fetch_page(
            &self.pool,
            MESSAGE_SELECT,
            "FROM chat_logs",
            &predicate,
            "ORDER BY timestamp DESC, id DESC",
            params,
        )
        .await
    }

    /// Full transcript of one conversation, oldest first.
    pub async fn for_conversation(&self, conversation_id: i64) -> anyhow::Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "{MESSAGE_SELECT} WHERE conversation_id = ? ORDER BY timestamp ASC, id ASC"
        ))
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    /// Globally most recent messages, newest first.
    pub async fn recent(&self, limit: i64) -> anyhow::Result<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(&format!(
            "{MESSAGE_SELECT} ORDER BY timestamp DESC, id DESC LIMIT ?"
        ))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }
}
