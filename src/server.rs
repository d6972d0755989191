use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AppConfig, ServerConfig};
use crate::handlers;
use crate::store::activity::ActivityStore;
use crate::store::conversations::ConversationStore;
use crate::store::dashboard::DashboardStore;
use crate::store::messages::MessageStore;
use crate::store::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub conversations: ConversationStore,
    pub messages: MessageStore,
    pub dashboard: DashboardStore,
    pub activity: ActivityStore,
    pub display_offset_minutes: i64,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let users = UserStore::new(pool.clone());
        let conversations = ConversationStore::new(pool.clone());
        let messages = MessageStore::new(pool.clone());
        let dashboard = DashboardStore::new(pool);
        let activity = ActivityStore::new(conversations.clone(), messages.clone());
        Self {
            users,
            conversations,
            messages,
            dashboard,
            activity,
            display_offset_minutes: config.display.utc_offset_minutes,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/dashboard/stats", get(handlers::dashboard::stats))
        .route("/users", get(handlers::users::list))
        .route("/users/search/{query}", get(handlers::users::search))
        .route("/users/{identifier}", get(handlers::users::detail))
        .route("/users/{identifier}/conversations", get(handlers::users::conversations))
        .route("/conversations", get(handlers::conversations::list))
        .route("/conversations/{id}", get(handlers::conversations::detail))
        .route("/messages", get(handlers::messages::list))
        .route("/activity/recent", get(handlers::activity::recent))
        .route("/analytics/usage", get(handlers::analytics::usage))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub async fn start(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    let app = build_router(state);

    let ip: std::net::IpAddr = config
        .bind_addr
        .parse()
        .unwrap_or_else(|_| std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let addr = std::net::SocketAddr::new(ip, config.port);
    info!("Admin API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
