use super::gateway_harness::{GatewayTestServer, completion_body, received_json};
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn reserved_model_runs_persona_turn() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "temperature": 0.7,
            "max_tokens": 200,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Good morning, nya~")))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream, |_| {}).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/v1/chat/completions"))
        .json(&json!({
            "model": "neko",
            "messages": [{"role": "user", "content": "good morning"}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["model"], "neko");
    assert_eq!(body["choices"][0]["message"]["content"], "Good morning, nya~");
    assert_eq!(body["usage"]["prompt_tokens"], 21);
    assert_eq!(body["usage"]["total_tokens"], 27);

    let sent = received_json(&upstream).await;
    assert_eq!(sent[0]["messages"][0]["role"], "system");
    assert_eq!(sent[0]["messages"][1]["content"], "good morning");

    let usage: Value = client
        .get(server.url("/api/usage"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(usage["transcript_len"], 3);
}

#[tokio::test]
async fn streaming_reply_uses_relay_envelope() {
    let upstream = MockServer::start().await;
    let sse = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo!\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n"
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse, "text/event-stream"))
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream, |_| {}).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/v1/chat/completions"))
        .json(&json!({
            "model": "neko",
            "stream": true,
            "messages": [{"role": "user", "content": "say hello"}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let text = response.text().await.unwrap();
    assert!(text.contains(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"index\":0,\"finish_reason\":null}]}\n\n"
    ));
    assert!(text.contains(
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo!\"},\"index\":0,\"finish_reason\":null}]}\n\n"
    ));
    assert!(text.trim_end().ends_with("data: [DONE]"));

    let records: Value = client
        .get(server.url("/api/records"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(records["records"][0]["ai_response"], "Hello!");
}

#[tokio::test]
async fn other_models_are_relayed_without_touching_the_session() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "deepseek-reasoner"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("42")))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream, |_| {}).await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(server.url("/v1/chat/completions"))
        .json(&json!({
            "model": "deepseek-reasoner",
            "messages": [{"role": "user", "content": "what is six times seven"}]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["choices"][0]["message"]["content"], "42");
    assert_eq!(body["model"], "deepseek-reasoner");

    let sent = received_json(&upstream).await;
    assert_eq!(sent[0]["messages"][0]["role"], "system");

    let usage: Value = client
        .get(server.url("/api/usage"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(usage["transcript_len"], 1);
}

#[tokio::test]
async fn upstream_failure_is_answered_in_character() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream, |_| {}).await;

    let response = reqwest::Client::new()
        .post(server.url("/v1/chat/completions"))
        .json(&json!({
            "model": "neko",
            "messages": [{"role": "user", "content": "hello"}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let content = body["choices"][0]["message"]["content"].as_str().unwrap();
    assert!(content.starts_with("Uwu... something went wrong"), "{content}");
}

#[tokio::test]
async fn unified_endpoint_always_uses_persona() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "deepseek-chat"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("meow")))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream, |_| {}).await;

    let body: Value = reqwest::Client::new()
        .post(server.url("/v1/unified/chat/completions"))
        .json(&json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["choices"][0]["message"]["content"], "meow");
}

#[tokio::test]
async fn models_lists_persona_and_upstream_ids() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{"id": "deepseek-chat"}, {"id": "deepseek-reasoner"}]
        })))
        .mount(&upstream)
        .await;

    let server = GatewayTestServer::start(&upstream, |_| {}).await;

    let body: Value = reqwest::get(server.url("/v1/models"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["neko", "deepseek-chat", "deepseek-reasoner"]);
}
