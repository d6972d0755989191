use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::default_limit;
use crate::error::ApiError;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

pub async fn recent(
    State(state): State<AppState>,
    Query(q): Query<RecentQuery>,
) -> Result<Json<Value>, ApiError> {
    let activity = state
        .activity
        .recent(q.limit)
        .await
        .map_err(|e| ApiError::internal("fetching recent activity", e))?;
    Ok(Json(json!({ "activity": activity })))
}
