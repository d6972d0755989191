use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failures surfaced over HTTP.
///
/// Two shapes only: a lookup that matched zero rows becomes a 404 with
/// `{"error":"<Entity> not found"}`, and everything else becomes a 500 with
/// the context label of the operation that failed plus the underlying
/// message. Not-found is a normal outcome and is not logged as an error.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, source: anyhow::Error) -> Self {
        Self::Internal { context, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(entity) => {
                let body = json!({ "error": format!("{entity} not found") });
                (StatusCode::NOT_FOUND, axum::Json(body)).into_response()
            }
            ApiError::Internal { context, source } => {
                error!("{context} failed: {source:#}");
                let body = json!({
                    "error": "Internal server error",
                    "message": source.to_string(),
                    "context": context,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
            }
        }
    }
}
