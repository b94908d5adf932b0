use nekorelay::config::Config;
use nekorelay::transport::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// A gateway bound to an ephemeral port, backed by a temporary data dir.
pub struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
    _data_dir: TempDir,
}

impl GatewayTestServer {
    /// `completion` stands in for the upstream chat provider.
    pub async fn start(completion: &MockServer, configure: impl FnOnce(&mut Config)) -> Self {
        let data_dir = TempDir::new().expect("temp data dir should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::default();
        config.data_dir = data_dir.path().to_path_buf();
        config.config_path = data_dir.path().join("config.toml");
        config.api_key = Some("sk-test-key".to_string());
        config.base_url = completion.uri();
        config.storage.prune_interval_secs = 0;
        configure(&mut config);

        let config = Arc::new(config);
        let handle = tokio::spawn(async move {
            run_gateway_with_listener("127.0.0.1", listener, config).await
        });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            handle,
            _data_dir: data_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..200 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

/// OpenAI-style non-streaming completion body.
pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "model": "deepseek-chat",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 21, "completion_tokens": 6}
    })
}

/// JSON bodies of every request with a body the mock received.
pub async fn received_json(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| !request.body.is_empty())
        .map(|request| serde_json::from_slice(&request.body).expect("request body should be json"))
        .collect()
}

/// Content of the last message sent upstream in `body`.
pub fn last_message_content(body: &serde_json::Value) -> String {
    body["messages"]
        .as_array()
        .and_then(|messages| messages.last())
        .and_then(|message| message["content"].as_str())
        .unwrap_or_default()
        .to_string()
}
