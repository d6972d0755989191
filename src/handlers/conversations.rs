use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{default_limit, default_page};
use crate::error::ApiError;
use crate::pagination::PageParams;
use crate::server::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PageParams::new(q.page, q.limit);
    let (conversations, pagination) = state
        .conversations
        .list(q.status.as_deref(), q.search.as_deref(), &params)
        .await
        .map_err(|e| ApiError::internal("fetching conversations", e))?;
    Ok(Json(
        json!({ "conversations": conversations, "pagination": pagination }),
    ))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let conversation = state
        .conversations
        .get(id)
        .await
        .map_err(|e| ApiError::internal("fetching conversation", e))?
        .ok_or(ApiError::NotFound("Conversation"))?;

    let messages = state
        .messages
        .for_conversation(id)
        .await
        .map_err(|e| ApiError::internal("fetching conversation messages", e))?;

    Ok(Json(json!({
        "conversation": conversation,
        "messages": messages,
    })))
}
