//! HTTP and WebSocket gateway for FactQuest.
//!
//! Serves the browser chat page, a WebSocket endpoint that runs one session
//! per connection, a read-only view of live session history, and a health
//! check.
//!
//! Built on Axum.

pub mod frontend;
pub mod ws;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use factquest_agent::TurnRunner;
use factquest_config::{AppConfig, Secrets};
use factquest_core::message::{ConversationId, Role};
use factquest_core::SessionStore;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Largest client frame or request body accepted.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub runner: TurnRunner,
    pub sessions: SessionStore,
}

impl GatewayState {
    pub fn new(runner: TurnRunner, max_sessions: usize) -> Self {
        Self {
            runner,
            sessions: SessionStore::new(max_sessions),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
///
/// Only `/health` is readable cross-origin; session history stays same-origin.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_handler).layer(cors))
        .route("/ws", get(ws::ws_handler))
        .route("/sessions/{id}", get(session_handler))
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server and run until Ctrl+C.
pub async fn start(config: AppConfig, secrets: Secrets) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let runner = TurnRunner::from_config(&config, &secrets)?;
    let state = Arc::new(GatewayState::new(runner, config.gateway.max_sessions));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening; open http://{addr}/ to chat");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HistoryEntry {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct SessionHistory {
    session_id: String,
    messages: Vec<HistoryEntry>,
}

/// `GET /sessions/{id}`: history of a live session.
async fn session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let Some(session) = state.sessions.get(&ConversationId(id.clone())).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("No live session '{id}'") })),
        )
            .into_response();
    };

    let conv = session.lock().await;
    let messages = conv
        .messages
        .iter()
        .map(|m| HistoryEntry {
            role: m.role,
            content: m.content.clone(),
            timestamp: m.timestamp,
        })
        .collect();

    Json(SessionHistory {
        session_id: id,
        messages,
    })
    .into_response()
}
