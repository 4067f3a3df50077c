//! HTTP surface: health check and the reminder trigger endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Local;
use teloxide::Bot;
use tokio_util::sync::CancellationToken;

use crate::common::BotEnv;
use crate::dispatch;
use crate::utils::ResultExt;

struct AppState {
    bot: Bot,
    env: Arc<BotEnv>,
}

pub async fn run(
    bot: Bot,
    env: Arc<BotEnv>,
    addr: SocketAddr,
    cancel: CancellationToken,
) {
    let app_state = Arc::new(AppState { bot, env });

    let app = Router::new()
        .route("/health", get(health))
        .route("/send-reminders", post(send_reminders))
        .with_state(app_state);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(cancel.cancelled())
        .await
        .log_error("Web server error");
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Local::now().to_rfc3339(),
        "service": "padharamani-bot",
    }))
}

/// Scheduled-trigger entry point. The delivery run is spawned and the
/// caller only gets an immediate acknowledgment; results go to the log.
async fn send_reminders(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    log::info!("Received reminder trigger request");
    let bot = state.bot.clone();
    let env = Arc::clone(&state.env);
    tokio::spawn(async move {
        dispatch::send_daily_reminders(&bot, &env).await;
    });
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "accepted",
            "message": "daily reminder run started",
            "timestamp": Local::now().to_rfc3339(),
        })),
    )
}
