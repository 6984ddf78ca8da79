use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use shetkari_core::error::ShetkariError;
use shetkari_core::models::ChatRequest;
use shetkari_core::service::ChatService;
use tower_http::cors::CorsLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub chat: ChatService,
}

pub fn app_state(chat: ChatService) -> AppState {
    Arc::new(AppStateInner { chat })
}

/// Logs the error and renders it the way browser clients expect: a 500 with
/// a `detail` field.
fn internal_error(err: ShetkariError) -> (StatusCode, Json<serde_json::Value>) {
    err.log();
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"detail": err.to_string()})),
    )
}

async fn api_chat_send(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.chat.send_message(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => internal_error(err).into_response(),
    }
}

async fn api_chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.chat.session_history(&session_id).await {
        Ok(history) => Json(history).into_response(),
        Err(err) => internal_error(err).into_response(),
    }
}

async fn api_health() -> impl IntoResponse {
    Json(json!({"status": "ok", "service": "shetkari-server"}))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat/send", post(api_chat_send))
        .route("/api/chat/history/{session_id}", get(api_chat_history))
        .route("/api/health", get(api_health))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!("HTTP API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
