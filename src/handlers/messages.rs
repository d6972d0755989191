use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_limit, default_page};
use crate::error::ApiError;
use crate::pagination::PageParams;
use crate::server::AppState;
use crate::store::messages::MessageFilters;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    date_from: Option<String>,
    #[serde(default)]
    date_to: Option<String>,
}

/// Coerce an id query param deterministically: empty or non-numeric values
/// are treated as absent filters.
fn numeric(value: &Option<String>) -> Option<i64> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PageParams::new(q.page, q.limit);
    let filters = MessageFilters {
        conversation_id: numeric(&q.conversation_id),
        user_id: numeric(&q.user_id),
        search: q.search.as_deref(),
        date_from: q.date_from.as_deref(),
        date_to: q.date_to.as_deref(),
    };
    let (messages, pagination) = state
        .messages
        .list(&filters, &params)
        .await
        .map_err(|e| ApiError::internal("fetching messages", e))?;
    Ok(Json(json!({ "messages": messages, "pagination": pagination })))
}
