use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::config::DatabaseConfig;

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;
    info!("Connected to database at {}", config.url);
    Ok(pool)
}

/// Idempotent schema setup for the relations this API reads.
///
/// The chat platform owns these tables in production; creating them here
/// (with `IF NOT EXISTS`) lets the binary start against an empty file and
/// gives tests a schema. `dashboard_stats` is deliberately NOT created: it
/// is an optional precomputed summary maintained by the platform, and the
/// dashboard aggregator must tolerate its absence.
pub async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            gender TEXT NOT NULL DEFAULT 'unknown',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS conversations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user1_id INTEGER NOT NULL,
            user1_username TEXT NOT NULL,
            user2_id INTEGER NOT NULL,
            user2_username TEXT NOT NULL,
            started_at TEXT NOT NULL,
            ended_at TEXT,
            status TEXT NOT NULL DEFAULT 'active'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS chat_logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            conversation_id INTEGER NOT NULL,
            sender_id INTEGER NOT NULL,
            sender_username TEXT NOT NULL,
            receiver_id INTEGER NOT NULL,
            receiver_username TEXT NOT NULL,
            message TEXT NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Indexes for the hot read paths
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_chat_logs_conversation_time
         ON chat_logs(conversation_id, timestamp)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_chat_logs_time ON chat_logs(timestamp DESC)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_conversations_started
         ON conversations(started_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_conversations_status ON conversations(status)")
        .execute(pool)
        .await?;

    info!("Schema migration complete");
    Ok(())
}
