//! Axum HTTP gateway: OpenAI-compatible completion relay, console API and
//! the embedded web console.
//!
//! Every chat-shaped endpoint answers with conversational text, including on
//! provider failure; HTTP errors are reserved for malformed requests.

mod handlers;
pub(crate) mod openai_compat_handler;
pub(crate) mod openai_compat_streaming;
pub(crate) mod openai_compat_types;
mod server;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::core::orchestrator::Orchestrator;
use std::sync::Arc;
use std::time::Duration;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Model id that routes through the persona pipeline.
    pub reserved_model: String,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, reserved_model: impl Into<String>) -> Self {
        let request_timeout = orchestrator.settings().raw_timeout + DEFAULT_TIMEOUT_MARGIN;
        Self {
            orchestrator,
            reserved_model: reserved_model.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout,
        }
    }

    #[must_use]
    pub fn with_limits(mut self, max_body_bytes: usize, request_timeout: Duration) -> Self {
        self.max_body_bytes = max_body_bytes;
        self.request_timeout = request_timeout;
        self
    }
}

/// Inline images make chat bodies large.
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_TIMEOUT_MARGIN: Duration = Duration::from_secs(30);

#[cfg(test)]
mod tests;
