use axum::extract::State;
use axum::Json;
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::server::AppState;

/// The three stat groups are independent and fetched concurrently; the
/// conversation group transparently uses the precomputed summary when the
/// platform maintains one.
pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let offset = state.display_offset_minutes;

    let users = state.dashboard.user_breakdown();
    let conversations = state.dashboard.conversation_summary(offset);
    let messages = state.dashboard.message_overview(offset);
    let (users, conversations, messages) = tokio::join!(users, conversations, messages);

    let users = users.map_err(|e| ApiError::internal("fetching user stats", e))?;
    let source = conversations.map_err(|e| ApiError::internal("fetching conversation stats", e))?;
    let messages = messages.map_err(|e| ApiError::internal("fetching message stats", e))?;

    if !source.is_precomputed() {
        tracing::debug!("dashboard summary aggregated from raw relations");
    }

    let mut by_gender = Map::new();
    for entry in &users.by_gender {
        by_gender.insert(entry.gender.clone(), json!(entry.count));
    }

    let summary = source.summary();
    Ok(Json(json!({
        "users": {
            "total": users.total,
            "byGender": by_gender,
        },
        "conversations": {
            "total": summary.total,
            "active": summary.active,
            "ended": summary.ended,
            "avgMessages": summary.avg_messages,
            "today": summary.today,
        },
        "messages": {
            "total": messages.total,
            "uniqueSenders": messages.unique_senders,
            "dailyStats": messages.daily,
        },
    })))
}
