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
    search: Option<String>,
    #[serde(default)]
    gender: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PageParams::new(q.page, q.limit);
    let (users, pagination) = state
        .users
        .list(q.search.as_deref(), q.gender.as_deref(), &params)
        .await
        .map_err(|e| ApiError::internal("fetching users", e))?;
    Ok(Json(json!({ "users": users, "pagination": pagination })))
}

pub async fn detail(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .users
        .resolve(&identifier)
        .await
        .map_err(|e| ApiError::internal("fetching user", e))?
        .ok_or(ApiError::NotFound("User"))?;

    let stats = state.users.stats(user.id);
    let recent = state.conversations.recent_for_user(user.id, 5);
    let (stats, recent) = tokio::join!(stats, recent);
    let stats = stats.map_err(|e| ApiError::internal("fetching user stats", e))?;
    let recent = recent.map_err(|e| ApiError::internal("fetching user conversations", e))?;

    Ok(Json(json!({
        "user": user,
        "stats": stats,
        "recentConversations": recent,
    })))
}

#[derive(Deserialize)]
pub struct UserConversationsQuery {
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_user_conversations_limit")]
    limit: i64,
}

fn default_user_conversations_limit() -> i64 {
    10
}

pub async fn conversations(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(q): Query<UserConversationsQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = PageParams::new(q.page, q.limit);
    let (conversations, pagination) = state
        .conversations
        .for_user(user_id, &params)
        .await
        .map_err(|e| ApiError::internal("fetching user conversations", e))?;
    Ok(Json(
        json!({ "conversations": conversations, "pagination": pagination }),
    ))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default = "default_limit")]
    limit: i64,
}

pub async fn search(
    State(state): State<AppState>,
    Path(query): Path<String>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let users = state
        .users
        .search(&query, q.limit)
        .await
        .map_err(|e| ApiError::internal("searching users", e))?;
    Ok(Json(json!({ "users": users })))
}
