use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8888)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Allowed CORS origins; empty disables the CORS layer, `*` allows any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes (inline images count against this).
    #[serde(default = "default_body_limit")]
    pub max_body_bytes: usize,
    /// Extra seconds granted on top of the relay timeout before the HTTP
    /// layer gives up on a request.
    #[serde(default = "default_timeout_margin_secs")]
    pub timeout_margin_secs: u64,
}

fn default_gateway_port() -> u16 {
    8888
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_body_limit() -> usize {
    16 * 1024 * 1024
}

fn default_timeout_margin_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            cors_origins: Vec::new(),
            max_body_bytes: default_body_limit(),
            timeout_margin_secs: default_timeout_margin_secs(),
        }
    }
}
