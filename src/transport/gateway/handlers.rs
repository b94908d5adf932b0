use crate::core::orchestrator::{TurnInput, TurnOutcome};
use crate::storage::MAX_RECENT_LIMIT;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
};
use serde::Deserialize;

use super::AppState;

const CONSOLE_PAGE: &str = include_str!("console.html");
const DEFAULT_RECORDS_LIMIT: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct ConsoleChatBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRecordBody {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteFirstNBody {
    pub n: u32,
}

fn storage_failure(error: &impl std::fmt::Display) -> Response {
    tracing::error!(%error, "console storage request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "success": false, "error": "storage unavailable" })),
    )
        .into_response()
}

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /
pub(super) async fn handle_index(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "nekorelay",
        "version": env!("CARGO_PKG_VERSION"),
        "persona": state.orchestrator.session().persona().name,
        "reserved_model": state.reserved_model,
        "endpoints": [
            "POST /v1/chat/completions",
            "POST /v1/unified/chat/completions",
            "GET  /v1/models",
            "GET  /health",
            "POST /chat",
            "GET  /api/records",
            "POST /api/delete_record",
            "POST /api/clear_records",
            "POST /api/delete_first_n",
            "POST /api/reset_history",
            "POST /api/reload_persona",
            "GET  /api/usage",
            "GET  /console",
        ],
    }))
}

/// GET /console
pub(super) async fn handle_console() -> Html<&'static str> {
    Html(CONSOLE_PAGE)
}

/// POST /chat
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    Json(body): Json<ConsoleChatBody>,
) -> Response {
    let input = TurnInput::new(body.message.as_deref(), body.image.as_deref());
    if input.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "message or image is required",
            })),
        )
            .into_response();
    }

    let reply = state.orchestrator.respond(input).await;
    Json(serde_json::json!({
        "success": reply.outcome == TurnOutcome::Completed,
        "reply": reply.text,
    }))
    .into_response()
}

/// GET /api/records
pub(super) async fn handle_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Response {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECORDS_LIMIT)
        .min(MAX_RECENT_LIMIT);
    match state.orchestrator.store().recent_exchanges(limit).await {
        Ok(records) => Json(serde_json::json!({ "success": true, "records": records }))
            .into_response(),
        Err(error) => storage_failure(&error),
    }
}

/// POST /api/delete_record
pub(super) async fn handle_delete_record(
    State(state): State<AppState>,
    Json(body): Json<DeleteRecordBody>,
) -> Response {
    match state.orchestrator.store().delete_exchange(body.id).await {
        Ok(true) => Json(serde_json::json!({ "success": true })).into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "success": false, "error": "record not found" })),
        )
            .into_response(),
        Err(error) => storage_failure(&error),
    }
}

/// POST /api/clear_records
pub(super) async fn handle_clear_records(State(state): State<AppState>) -> Response {
    match state.orchestrator.store().clear_exchanges().await {
        Ok(deleted) => {
            tracing::info!(deleted, "chat history cleared from console");
            Json(serde_json::json!({ "success": true, "deleted": deleted })).into_response()
        }
        Err(error) => storage_failure(&error),
    }
}

/// POST /api/delete_first_n
pub(super) async fn handle_delete_first_n(
    State(state): State<AppState>,
    Json(body): Json<DeleteFirstNBody>,
) -> Response {
    if body.n == 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "success": false, "error": "n must be positive" })),
        )
            .into_response();
    }
    match state.orchestrator.store().delete_oldest(body.n).await {
        Ok(deleted) => {
            Json(serde_json::json!({ "success": true, "deleted": deleted })).into_response()
        }
        Err(error) => storage_failure(&error),
    }
}

/// POST /api/reset_history
pub(super) async fn handle_reset_history(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.orchestrator.session();
    session.reset_history().await;
    Json(serde_json::json!({
        "success": true,
        "transcript_len": session.transcript_len().await,
    }))
}

/// POST /api/reload_persona: switch the session to the stored persona.
pub(super) async fn handle_reload_persona(State(state): State<AppState>) -> Response {
    let persona = match state.orchestrator.store().load_persona().await {
        Ok(Some(persona)) => persona,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "success": false, "error": "no stored persona" })),
            )
                .into_response();
        }
        Err(error) => return storage_failure(&error),
    };

    let session = state.orchestrator.session();
    if let Err(error) = session.reinitialize(persona).await {
        tracing::error!(%error, "persona reload failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "success": false, "error": "persona prompt render failed" })),
        )
            .into_response();
    }
    Json(serde_json::json!({
        "success": true,
        "persona": session.persona().name,
        "transcript_len": session.transcript_len().await,
    }))
    .into_response()
}

/// GET /api/usage
pub(super) async fn handle_usage(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.orchestrator.session();
    let usage = session.usage().snapshot();
    Json(serde_json::json!({
        "input_tokens": usage.input_tokens,
        "output_tokens": usage.output_tokens,
        "completions": usage.completions,
        "uptime_secs": session.uptime().as_secs(),
        "transcript_len": session.transcript_len().await,
        "persona": session.persona().name,
    }))
}
