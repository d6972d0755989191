use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct UsageQuery {
    #[serde(default = "default_usage_days")]
    days: u32,
}

fn default_usage_days() -> u32 {
    7
}

pub async fn usage(
    State(state): State<AppState>,
    Query(q): Query<UsageQuery>,
) -> Result<Json<Value>, ApiError> {
    let days = q.days.clamp(1, 90);
    let report = state
        .dashboard
        .usage(days, state.display_offset_minutes)
        .await
        .map_err(|e| ApiError::internal("fetching usage analytics", e))?;
    let body = serde_json::to_value(&report)
        .map_err(|e| ApiError::internal("fetching usage analytics", e.into()))?;
    Ok(Json(body))
}
