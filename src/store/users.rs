use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::pagination::{fetch_page, PageParams, Pagination};
use crate::query::Predicate;

const USER_SELECT: &str = "SELECT id, username, gender, created_at FROM users";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub gender: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub conversation_count: i64,
    pub message_count: i64,
}

/// Prefix a bare handle with its `@` marker; handles that already carry the
/// marker pass through unchanged.
pub fn normalize_handle(raw: &str) -> String {
    if raw.starts_with('@') {
        raw.to_string()
    } else {
        format!("@{raw}")
    }
}

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Paged listing with optional handle substring and gender filters.
    pub async fn list(
        &self,
        search: Option<&str>,
        gender: Option<&str>,
        params: &PageParams,
    ) -> anyhow::Result<(Vec<User>, Pagination)> {
        let mut predicate = Predicate::new();
        predicate.contains("username", search);
        predicate.equals_text("gender", gender);

        fetch_page(
            &self.pool,
            USER_SELECT,
            "FROM users",
            &predicate,
            "ORDER BY created_at DESC, id DESC",
            params,
        )
        .await
    }

    /// Resolve a path segment that is either a numeric id or a handle. A
    /// segment that parses entirely as a number is looked up by id,
    /// otherwise by handle with the marker normalized on.
    pub async fn resolve(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        if let Ok(id) = identifier.parse::<i64>() {
            self.by_id(id).await
        } else {
            self.by_username(&normalize_handle(identifier)).await
        }
    }

    async fn by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Conversation and sent-message counts for one user; the two counts are
    /// independent and fetched concurrently.
    pub async fn stats(&self, user_id: i64) -> anyhow::Result<UserStats> {
        let conversations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM conversations WHERE user1_id = ?1 OR user2_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&self.pool);

        let messages =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_logs WHERE sender_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool);

        let (conversation_count, message_count) = tokio::join!(conversations, messages);
        Ok(UserStats {
            conversation_count: conversation_count?,
            message_count: message_count?,
        })
    }

    /// Bare handle search for typeahead-style lookups.
    pub async fn search(&self, query: &str, limit: i64) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "{USER_SELECT} WHERE LOWER(username) LIKE LOWER(?) ORDER BY username ASC LIMIT ?"
        ))
        .bind(format!("%{}%", query.trim()))
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}
