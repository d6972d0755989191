//! Global statistics with a precomputed-or-live two-path aggregator.

use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

/// Conversation-level totals for the dashboard, identical in shape whichever
/// path produced them. `avg_messages` is rounded to the nearest integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub total: i64,
    pub active: i64,
    pub ended: i64,
    pub avg_messages: i64,
    pub today: i64,
}

/// Which path produced the summary. The platform may maintain a
/// `dashboard_stats` table; when it is missing or empty the summary is
/// aggregated live from the raw relations instead. Callers observe the same
/// shape either way.
#[derive(Debug)]
pub enum SummarySource {
    Precomputed(ConversationSummary),
    Computed(ConversationSummary),
}

impl SummarySource {
    pub fn summary(&self) -> &ConversationSummary {
        match self {
            SummarySource::Precomputed(s) | SummarySource::Computed(s) => s,
        }
    }

    pub fn is_precomputed(&self) -> bool {
        matches!(self, SummarySource::Precomputed(_))
    }
}

#[derive(Debug, Serialize)]
pub struct GenderCount {
    pub gender: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct UserBreakdown {
    pub total: i64,
    pub by_gender: Vec<GenderCount>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct DayCount {
    pub day: Option<String>,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageOverview {
    pub total: i64,
    pub unique_senders: i64,
    pub daily: Vec<DayCount>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub user_registrations: Vec<DayCount>,
    pub conversations: Vec<DayCount>,
    pub messages: Vec<DayCount>,
    pub active_users: Vec<DayCount>,
}

/// SQLite date modifier applying the fixed display offset, e.g. "+210 minutes".
fn offset_modifier(minutes: i64) -> String {
    format!("{minutes:+} minutes")
}

#[derive(Clone)]
pub struct DashboardStore {
    pool: SqlitePool,
}

impl DashboardStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Prefer the precomputed summary row; fall back to live aggregation when
    /// the read fails (table absent) or yields no row. The fallback is never
    /// surfaced to the caller as an error.
    pub async fn conversation_summary(
        &self,
        offset_minutes: i64,
    ) -> anyhow::Result<SummarySource> {
        match self.read_precomputed().await {
            Ok(Some(summary)) => Ok(SummarySource::Precomputed(summary)),
            Ok(None) => Ok(SummarySource::Computed(
                self.aggregate_live(offset_minutes).await?,
            )),
            Err(e) => {
                warn!("dashboard_stats unavailable, aggregating live: {e}");
                Ok(SummarySource::Computed(
                    self.aggregate_live(offset_minutes).await?,
                ))
            }
        }
    }

    async fn read_precomputed(&self) -> anyhow::Result<Option<ConversationSummary>> {
        #[derive(FromRow)]
        struct StatsRow {
            total_conversations: Option<i64>,
            active_conversations: Option<i64>,
            ended_conversations: Option<i64>,
            avg_messages_per_conversation: Option<f64>,
            conversations_today: Option<i64>,
        }

        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT total_conversations, active_conversations, ended_conversations, \
             avg_messages_per_conversation, conversations_today \
             FROM dashboard_stats LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ConversationSummary {
            total: r.total_conversations.unwrap_or(0),
            active: r.active_conversations.unwrap_or(0),
            ended: r.ended_conversations.unwrap_or(0),
            avg_messages: r.avg_messages_per_conversation.unwrap_or(0.0).round() as i64,
            today: r.conversations_today.unwrap_or(0),
        }))
    }

    async fn aggregate_live(&self, offset_minutes: i64) -> anyhow::Result<ConversationSummary> {
        #[derive(FromRow)]
        struct LiveRow {
            total: i64,
            active: i64,
            ended: i64,
            messages: i64,
            today: i64,
        }

        let row = sqlx::query_as::<_, LiveRow>(
            "SELECT \
               (SELECT COUNT(*) FROM conversations) AS total, \
               (SELECT COUNT(*) FROM conversations WHERE status = 'active') AS active, \
               (SELECT COUNT(*) FROM conversations WHERE status = 'ended') AS ended, \
               (SELECT COUNT(*) FROM chat_logs) AS messages, \
               (SELECT COUNT(*) FROM conversations \
                  WHERE date(started_at, ?1) = date('now', ?1)) AS today",
        )
        .bind(offset_modifier(offset_minutes))
        .fetch_one(&self.pool)
        .await?;

        let avg_messages = if row.total == 0 {
            0
        } else {
            (row.messages as f64 / row.total as f64).round() as i64
        };

        Ok(ConversationSummary {
            total: row.total,
            active: row.active,
            ended: row.ended,
            avg_messages,
            today: row.today,
        })
    }

    /// User total plus per-gender counts, fetched concurrently.
    pub async fn user_breakdown(&self) -> anyhow::Result<UserBreakdown> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(&self.pool);
        let by_gender = sqlx::query_as::<_, (String, i64)>(
            "SELECT gender, COUNT(*) FROM users GROUP BY gender ORDER BY COUNT(*) DESC",
        )
        .fetch_all(&self.pool);

        let (total, by_gender) = tokio::join!(total, by_gender);
        Ok(UserBreakdown {
            total: total?,
            by_gender: by_gender?
                .into_iter()
                .map(|(gender, count)| GenderCount { gender, count })
                .collect(),
        })
    }

    /// Message totals plus a seven-day daily series in the display timezone.
    pub async fn message_overview(&self, offset_minutes: i64) -> anyhow::Result<MessageOverview> {
        let modifier = offset_modifier(offset_minutes);

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_logs").fetch_one(&self.pool);
        let unique_senders =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT sender_id) FROM chat_logs")
                .fetch_one(&self.pool);
        let daily = sqlx::query_as::<_, DayCount>(
            "SELECT date(timestamp, ?1) AS day, COUNT(*) AS count \
             FROM chat_logs \
             WHERE timestamp >= datetime('now', '-7 days') \
             GROUP BY day ORDER BY day DESC",
        )
        .bind(&modifier)
        .fetch_all(&self.pool);

        let (total, unique_senders, daily) = tokio::join!(total, unique_senders, daily);
        Ok(MessageOverview {
            total: total?,
            unique_senders: unique_senders?,
            daily: daily?,
        })
    }

    /// Daily registration/conversation/message/active-user series over the
    /// last `days` days; the four series are independent and fetched
    /// concurrently.
    pub async fn usage(&self, days: u32, offset_minutes: i64) -> anyhow::Result<UsageReport> {
        let modifier = offset_modifier(offset_minutes);

        let user_registrations = sqlx::query_as::<_, DayCount>(
            "SELECT date(created_at, ?1) AS day, COUNT(*) AS count \
             FROM users \
             WHERE created_at >= datetime('now', '-' || ?2 || ' days') \
             GROUP BY day ORDER BY day DESC",
        )
        .bind(&modifier)
        .bind(days)
        .fetch_all(&self.pool);

        let conversations = sqlx::query_as::<_, DayCount>(
            "SELECT date(started_at, ?1) AS day, COUNT(*) AS count \
             FROM conversations \
             WHERE started_at >= datetime('now', '-' || ?2 || ' days') \
             GROUP BY day ORDER BY day DESC",
        )
        .bind(&modifier)
        .bind(days)
        .fetch_all(&self.pool);

        let messages = sqlx::query_as::<_, DayCount>(
            "SELECT date(timestamp, ?1) AS day, COUNT(*) AS count \
             FROM chat_logs \
             WHERE timestamp >= datetime('now', '-' || ?2 || ' days') \
             GROUP BY day ORDER BY day DESC",
        )
        .bind(&modifier)
        .bind(days)
        .fetch_all(&self.pool);

        let active_users = sqlx::query_as::<_, DayCount>(
            "SELECT date(timestamp, ?1) AS day, COUNT(DISTINCT sender_id) AS count \
             FROM chat_logs \
             WHERE timestamp >= datetime('now', '-' || ?2 || ' days') \
             GROUP BY day ORDER BY day DESC",
        )
        .bind(&modifier)
        .bind(days)
        .fetch_all(&self.pool);

        let (user_registrations, conversations, messages, active_users) =
            tokio::join!(user_registrations, conversations, messages, active_users);

        Ok(UsageReport {
            user_registrations: user_registrations?,
            conversations: conversations?,
            messages: messages?,
            active_users: active_users?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testutil::{insert_conversation, insert_message, insert_user, test_pool};
    use sqlx::SqlitePool;

    async fn create_stats_table(pool: &SqlitePool) {
        sqlx::query(
            "CREATE TABLE dashboard_stats (
                total_conversations INTEGER,
                active_conversations INTEGER,
                ended_conversations INTEGER,
                avg_messages_per_conversation REAL,
                conversations_today INTEGER
            )",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_raw_relations(pool: &SqlitePool) {
        insert_conversation(
            pool,
            1,
            (1, "@alice"),
            (2, "@bob"),
            "2026-08-01T09:00:00+00:00",
            Some("2026-08-01T10:00:00+00:00"),
            "ended",
        )
        .await;
        insert_conversation(
            pool,
            2,
            (1, "@alice"),
            (3, "@carol"),
            &chrono::Utc::now().to_rfc3339(),
            None,
            "active",
        )
        .await;
        for id in 0..3 {
            insert_message(
                pool,
                100 + id,
                1,
                (1, "@alice"),
                (2, "@bob"),
                "hello",
                "2026-08-01T09:01:00+00:00",
            )
            .await;
        }
    }

    #[tokio::test]
    async fn precomputed_row_wins_when_present() {
        let pool = test_pool().await;
        create_stats_table(&pool).await;
        sqlx::query("INSERT INTO dashboard_stats VALUES (10, 4, 6, 4.6, 2)")
            .execute(&pool)
            .await
            .unwrap();
        // raw relations disagree on purpose; they must not be consulted
        seed_raw_relations(&pool).await;

        let store = DashboardStore::new(pool);
        let source = store.conversation_summary(0).await.unwrap();
        assert!(source.is_precomputed());
        assert_eq!(
            source.summary(),
            &ConversationSummary {
                total: 10,
                active: 4,
                ended: 6,
                avg_messages: 5, // 4.6 rounds up
                today: 2,
            }
        );
    }

    #[tokio::test]
    async fn empty_stats_table_falls_back_to_live_aggregation() {
        let pool = test_pool().await;
        create_stats_table(&pool).await;
        seed_raw_relations(&pool).await;

        let store = DashboardStore::new(pool);
        let source = store.conversation_summary(0).await.unwrap();
        assert!(!source.is_precomputed());
        let summary = source.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.active, 1);
        assert_eq!(summary.ended, 1);
        assert_eq!(summary.avg_messages, 2); // 3 messages / 2 conversations
        assert_eq!(summary.today, 1);
    }

    #[tokio::test]
    async fn missing_stats_table_falls_back_to_live_aggregation() {
        let pool = test_pool().await;
        seed_raw_relations(&pool).await;

        let store = DashboardStore::new(pool);
        let source = store.conversation_summary(0).await.unwrap();
        assert!(!source.is_precomputed());
        assert_eq!(source.summary().total, 2);
    }

    #[tokio::test]
    async fn null_precomputed_fields_default_to_zero() {
        let pool = test_pool().await;
        create_stats_table(&pool).await;
        sqlx::query("INSERT INTO dashboard_stats VALUES (NULL, NULL, NULL, NULL, NULL)")
            .execute(&pool)
            .await
            .unwrap();

        let store = DashboardStore::new(pool);
        let source = store.conversation_summary(0).await.unwrap();
        assert!(source.is_precomputed());
        assert_eq!(
            source.summary(),
            &ConversationSummary {
                total: 0,
                active: 0,
                ended: 0,
                avg_messages: 0,
                today: 0,
            }
        );
    }

    #[tokio::test]
    async fn live_aggregation_with_no_conversations_avoids_division() {
        let pool = test_pool().await;
        let store = DashboardStore::new(pool);
        let source = store.conversation_summary(0).await.unwrap();
        assert_eq!(source.summary().avg_messages, 0);
    }

    #[tokio::test]
    async fn user_breakdown_groups_by_gender() {
        let pool = test_pool().await;
        insert_user(&pool, 1, "@alice", "female", "2026-08-01T10:00:00+00:00").await;
        insert_user(&pool, 2, "@bob", "male", "2026-08-02T10:00:00+00:00").await;
        insert_user(&pool, 3, "@carol", "female", "2026-08-03T10:00:00+00:00").await;

        let store = DashboardStore::new(pool);
        let breakdown = store.user_breakdown().await.unwrap();
        assert_eq!(breakdown.total, 3);
        assert_eq!(breakdown.by_gender.len(), 2);
        assert_eq!(breakdown.by_gender[0].gender, "female");
        assert_eq!(breakdown.by_gender[0].count, 2);
    }

    #[tokio::test]
    async fn message_overview_counts_unique_senders() {
        let pool = test_pool().await;
        let now = chrono::Utc::now().to_rfc3339();
        insert_message(&pool, 1, 1, (1, "@alice"), (2, "@bob"), "a", &now).await;
        insert_message(&pool, 2, 1, (1, "@alice"), (2, "@bob"), "b", &now).await;
        insert_message(&pool, 3, 1, (2, "@bob"), (1, "@alice"), "c", &now).await;

        let store = DashboardStore::new(pool);
        let overview = store.message_overview(0).await.unwrap();
        assert_eq!(overview.total, 3);
        assert_eq!(overview.unique_senders, 2);
        assert_eq!(overview.daily.len(), 1);
        assert_eq!(overview.daily[0].count, 3);
    }

    #[tokio::test]
    async fn usage_report_has_all_four_series() {
        let pool = test_pool().await;
        let now = chrono::Utc::now().to_rfc3339();
        insert_user(&pool, 1, "@alice", "female", &now).await;
        insert_conversation(&pool, 1, (1, "@alice"), (2, "@bob"), &now, None, "active").await;
        insert_message(&pool, 1, 1, (1, "@alice"), (2, "@bob"), "hi", &now).await;

        let store = DashboardStore::new(pool);
        let report = store.usage(7, 0).await.unwrap();
        assert_eq!(report.user_registrations.len(), 1);
        assert_eq!(report.conversations.len(), 1);
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.active_users.len(), 1);
        assert_eq!(report.active_users[0].count, 1);
    }
}
