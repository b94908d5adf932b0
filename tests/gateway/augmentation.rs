use super::gateway_harness::{
    GatewayTestServer, completion_body, last_message_content, received_json,
};
use serde_json::{Value, json};
use std::io::Cursor;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tiny_png() -> Vec<u8> {
    let image = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 0, 0]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png should encode");
    bytes.into_inner()
}

async fn latest_record(server: &GatewayTestServer) -> Value {
    let records: Value = reqwest::get(server.url("/api/records?limit=1"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    records["records"][0].clone()
}

#[tokio::test]
async fn news_question_is_augmented_with_search_results() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Here is the news!")))
        .expect(1)
        .mount(&upstream)
        .await;

    let search = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/web-search"))
        .and(header("authorization", "Bearer bk"))
        .and(body_json(json!({"query": "最新人工智能新闻", "count": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"webPages": {"value": [
                {"name": "Model release", "url": "https://news.example/ai", "snippet": "A new model shipped."}
            ]}}
        })))
        .expect(1)
        .mount(&search)
        .await;

    let search_url = format!("{}/v1/web-search", search.uri());
    let server = GatewayTestServer::start(&upstream, move |config| {
        config.search.api_key = Some("bk".to_string());
        config.search.base_url = Some(search_url);
    })
    .await;

    let response: Value = reqwest::Client::new()
        .post(server.url("/chat"))
        .json(&json!({"message": "最新人工智能新闻"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["success"], true);
    assert_eq!(response["reply"], "Here is the news!");

    let sent = received_json(&upstream).await;
    let staged = last_message_content(&sent[0]);
    assert!(staged.starts_with("user question: 最新人工智能新闻"), "{staged}");
    assert!(staged.contains("Model release"));

    let record = latest_record(&server).await;
    assert_eq!(record["user_input"], "最新人工智能新闻");
    assert!(record["image_description"].is_null());
}

#[tokio::test]
async fn chit_chat_skips_search() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("purr")))
        .mount(&upstream)
        .await;

    let search = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&search)
        .await;

    let search_url = format!("{}/v1/web-search", search.uri());
    let server = GatewayTestServer::start(&upstream, move |config| {
        config.search.api_key = Some("bk".to_string());
        config.search.base_url = Some(search_url);
    })
    .await;

    reqwest::Client::new()
        .post(server.url("/chat"))
        .json(&json!({"message": "pat pat"}))
        .send()
        .await
        .unwrap();

    let sent = received_json(&upstream).await;
    assert_eq!(last_message_content(&sent[0]), "pat pat");
}

#[tokio::test]
async fn image_url_is_described_before_the_turn() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("What a dark square, nya~")))
        .expect(1)
        .mount(&upstream)
        .await;

    let assets = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cat.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(tiny_png(), "image/png"))
        .expect(1)
        .mount(&assets)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/aigc/multimodal-generation/generation"))
        .and(header("authorization", "Bearer vk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {"choices": [{"message": {"content": [{"text": "A tiny black square."}]}}]}
        })))
        .expect(1)
        .mount(&assets)
        .await;

    let vision_url = assets.uri();
    let server = GatewayTestServer::start(&upstream, move |config| {
        config.vision.api_key = Some("vk".to_string());
        config.vision.base_url = vision_url;
    })
    .await;

    let response: Value = reqwest::Client::new()
        .post(server.url("/chat"))
        .json(&json!({"image": format!("{}/cat.png", assets.uri())}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["reply"], "What a dark square, nya~");

    let sent = received_json(&upstream).await;
    let messages = sent[0]["messages"].as_array().unwrap();
    assert_eq!(
        messages[messages.len() - 2]["content"],
        "[image content]: A tiny black square."
    );
    assert_eq!(last_message_content(&sent[0]), "[user sent an image]");

    let record = latest_record(&server).await;
    assert_eq!(record["user_input"], "[image]");
    assert_eq!(record["image_description"], "A tiny black square.");
}
