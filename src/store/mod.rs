//! One store per domain, each wrapping the shared `SqlitePool`. All stores
//! are read-only: the chat platform owns the data, this API only shapes it.

pub mod activity;
pub mod conversations;
pub mod dashboard;
pub mod messages;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::migrate(&pool).await.unwrap();
        pool
    }

    pub async fn insert_user(
        pool: &SqlitePool,
        id: i64,
        username: &str,
        gender: &str,
        created_at: &str,
    ) {
        sqlx::query("INSERT INTO users (id, username, gender, created_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(username)
            .bind(gender)
            .bind(created_at)
            .execute(pool)
            .await
            .unwrap();
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_conversation(
        pool: &SqlitePool,
        id: i64,
        user1: (i64, &str),
        user2: (i64, &str),
        started_at: &str,
        ended_at: Option<&str>,
        status: &str,
    ) {
        sqlx::query(
            "INSERT INTO conversations
             (id, user1_id, user1_username, user2_id, user2_username, started_at, ended_at, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user1.0)
        .bind(user1.1)
        .bind(user2.0)
        .bind(user2.1)
        .bind(started_at)
        .bind(ended_at)
        .bind(status)
        .execute(pool)
        .await
        .unwrap();
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_message(
        pool: &SqlitePool,
        id: i64,
        conversation_id: i64,
        sender: (i64, &str),
        receiver: (i64, &str),
        body: &str,
        timestamp: &str,
    ) {
        sqlx::query(
            "INSERT INTO chat_logs
             (id, conversation_id, sender_id, sender_username, receiver_id, receiver_username, message, timestamp)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(conversation_id)
        .bind(sender.0)
        .bind(sender.1)
        .bind(receiver.0)
        .bind(receiver.1)
        .bind(body)
        .bind(timestamp)
        .execute(pool)
        .await
        .unwrap();
    }
}
