use super::handlers::{
    handle_chat, handle_clear_records, handle_console, handle_delete_first_n,
    handle_delete_record, handle_health, handle_index, handle_records, handle_reload_persona,
    handle_reset_history, handle_usage,
};
use super::openai_compat_handler::{
    handle_chat_completions, handle_models, handle_unified_chat_completions,
};
use super::AppState;

use crate::config::{Config, StorageConfig};
use crate::core::runtime::build_orchestrator;
use crate::error::TransportError;
use crate::storage::ExchangeStore;
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Run the HTTP gateway on `host:port`.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse().map_err(
        |err: std::net::AddrParseError| TransportError::BindAddress {
            addr: format!("{host}:{port}"),
            message: err.to_string(),
        },
    )?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind gateway socket {addr}"))?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
) -> Result<()> {
    let actual_port = listener
        .local_addr()
        .context("get gateway listener local address")?
        .port();
    let display_addr = format!("{host}:{actual_port}");

    let orchestrator = build_orchestrator(&config).await?;
    let request_timeout = orchestrator.settings().raw_timeout
        + Duration::from_secs(config.gateway.timeout_margin_secs);
    let state = AppState::new(Arc::clone(&orchestrator), &config.persona.reserved_model)
        .with_limits(config.gateway.max_body_bytes, request_timeout);

    let pruner = spawn_pruner(Arc::clone(orchestrator.store()), &config.storage);

    print_gateway_banner(&display_addr, &state);
    tracing::info!(addr = %display_addr, "gateway listening");

    let app = build_app(state, &config.gateway.cors_origins);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| TransportError::Serve(err.to_string()));

    if let Some(pruner) = pruner {
        pruner.abort();
    }
    served?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Background history pruning. `None` when disabled.
fn spawn_pruner(
    store: Arc<dyn ExchangeStore>,
    storage: &StorageConfig,
) -> Option<tokio::task::JoinHandle<()>> {
    if storage.prune_interval_secs == 0 {
        return None;
    }
    let max_records = storage.max_records;
    let batch = storage.prune_batch;
    let mut interval = tokio::time::interval(Duration::from_secs(storage.prune_interval_secs));

    Some(tokio::spawn(async move {
        loop {
            interval.tick().await;
            if let Err(error) = store.prune_to(max_records, batch).await {
                tracing::warn!(%error, "history pruning failed");
            }
        }
    }))
}

fn print_gateway_banner(display_addr: &str, state: &AppState) {
    let persona = state.orchestrator.session().persona();
    println!("nekorelay listening on http://{display_addr}");
    println!("  persona: {} (model id \"{}\")", persona.name, state.reserved_model);
    println!("  POST /v1/chat/completions");
    println!("  POST /v1/unified/chat/completions");
    println!("  GET  /v1/models");
    println!("  GET  /console");
    println!("  GET  /health");
}

pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let max_body_bytes = state.max_body_bytes;
    let request_timeout = state.request_timeout;

    let app = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/console", get(handle_console))
        .route("/chat", post(handle_chat))
        .route("/api/records", get(handle_records))
        .route("/api/delete_record", post(handle_delete_record))
        .route("/api/clear_records", post(handle_clear_records))
        .route("/api/delete_first_n", post(handle_delete_first_n))
        .route("/api/reset_history", post(handle_reset_history))
        .route("/api/reload_persona", post(handle_reload_persona))
        .route("/api/usage", get(handle_usage))
        .route("/v1/models", get(handle_models))
        .route("/v1/chat/completions", post(handle_chat_completions))
        .route(
            "/v1/unified/chat/completions",
            post(handle_unified_chat_completions),
        );

    let mut app = app
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ));

    if !cors_origins.is_empty() {
        let cors = CorsLayer::new()
            .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ]);
        let cors = if cors_origins.iter().any(|origin| origin == "*") {
            cors.allow_origin(Any)
        } else {
            let origins: Vec<_> = cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(origins)
        };
        app = app.layer(cors);
    }

    app
}
