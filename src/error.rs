use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `nekorelay`.
///
/// Provider-facing subsystems return their own error enum so the orchestrator
/// can branch on the failure kind instead of inspecting message text. Plumbing
/// code (config files, storage DDL, server start-up) keeps using
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum RelayError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Completion provider ─────────────────────────────────────────────
    #[error("completion: {0}")]
    Completion(#[from] CompletionError),

    // ── Augmentation ────────────────────────────────────────────────────
    #[error("search: {0}")]
    Search(#[from] SearchError),

    #[error("vision: {0}")]
    Vision(#[from] VisionError),

    // ── Storage ─────────────────────────────────────────────────────────
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    // ── Transport ───────────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("persona prompt render failed: {0}")]
    Template(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Completion provider errors ──────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("provider {provider} timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    #[error("provider {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("provider {provider} returned HTTP {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("provider {provider} response could not be decoded: {message}")]
    Decode { provider: String, message: String },

    #[error("provider {provider} returned no choices")]
    Empty { provider: String },

    #[error("stream from {provider} failed: {message}")]
    Streaming { provider: String, message: String },
}

impl CompletionError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

// ─── Search errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("search response did not match any known schema: {0}")]
    Schema(String),

    #[error("no search results found")]
    NoResults,

    #[error("search tool call could not be resolved: {0}")]
    ToolCall(String),
}

// ─── Vision errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum VisionError {
    /// The remote image itself could not be retrieved.
    #[error("image fetch failed: {0}")]
    Fetch(String),

    #[error("vision request failed: {0}")]
    Request(String),

    #[error("vision provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("vision response could not be decoded: {0}")]
    Decode(String),

    #[error("vision provider returned an empty description")]
    Empty,
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored persona is invalid: {0}")]
    InvalidPersona(String),
}

// ─── Transport errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid bind address {addr}: {message}")]
    BindAddress { addr: String, message: String },

    #[error("server error: {0}")]
    Serve(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, RelayError>;
