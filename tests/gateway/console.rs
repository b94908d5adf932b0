use super::gateway_harness::{GatewayTestServer, completion_body};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn upstream_replying(content: &str) -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(&upstream)
        .await;
    upstream
}

#[tokio::test]
async fn landing_pages_are_served() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream, |_| {}).await;

    let health: Value = reqwest::get(server.url("/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let index: Value = reqwest::get(server.url("/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(index["name"], "nekorelay");
    assert_eq!(index["reserved_model"], "neko");

    let console = reqwest::get(server.url("/console")).await.unwrap();
    assert_eq!(console.status(), StatusCode::OK);
    assert!(console.text().await.unwrap().contains("<html"));
}

#[tokio::test]
async fn empty_console_message_is_rejected() {
    let upstream = MockServer::start().await;
    let server = GatewayTestServer::start(&upstream, |_| {}).await;

    let response = reqwest::Client::new()
        .post(server.url("/chat"))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(upstream.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn records_can_be_listed_and_deleted() {
    let upstream = upstream_replying("mrrp").await;
    let server = GatewayTestServer::start(&upstream, |_| {}).await;
    let client = reqwest::Client::new();

    for message in ["one", "two", "three"] {
        let response: Value = client
            .post(server.url("/chat"))
            .json(&json!({ "message": message }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(response["success"], true);
        assert_eq!(response["reply"], "mrrp");
    }

    let records: Value = client
        .get(server.url("/api/records"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let records = records["records"].as_array().unwrap().clone();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["user_input"], "three");
    assert_eq!(records[0]["ai_response"], "mrrp");

    let newest = records[0]["id"].as_i64().unwrap();
    let deleted = client
        .post(server.url("/api/delete_record"))
        .json(&json!({ "id": newest }))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let again = client
        .post(server.url("/api/delete_record"))
        .json(&json!({ "id": newest }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let trimmed: Value = client
        .post(server.url("/api/delete_first_n"))
        .json(&json!({ "n": 1 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(trimmed["deleted"], 1);

    let cleared: Value = client
        .post(server.url("/api/clear_records"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cleared["deleted"], 1);
}

#[tokio::test]
async fn reset_history_keeps_only_the_system_message() {
    let upstream = upstream_replying("mew").await;
    let server = GatewayTestServer::start(&upstream, |_| {}).await;
    let client = reqwest::Client::new();

    client
        .post(server.url("/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap();

    let reset: Value = client
        .post(server.url("/api/reset_history"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset["transcript_len"], 1);

    let usage: Value = client
        .get(server.url("/api/usage"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(usage["completions"], 1);
    assert_eq!(usage["input_tokens"], 21);
}
