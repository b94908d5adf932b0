use super::handlers::{
    ConsoleChatBody, DeleteFirstNBody, DeleteRecordBody, RecordsQuery, handle_chat,
    handle_delete_first_n, handle_delete_record, handle_health, handle_records,
    handle_reload_persona, handle_reset_history, handle_usage,
};
use super::openai_compat_handler::handle_models;
use super::*;
use crate::config::RepliesConfig;
use crate::core::orchestrator::{TurnInput, TurnSettings};
use crate::core::persona::Persona;
use crate::core::providers::{
    Completion, CompletionFuture, CompletionProvider, CompletionRequest,
};
use crate::core::session::Session;
use crate::storage::{ExchangeStore, SqliteExchangeStore};
use axum::{
    body::to_bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

struct CannedProvider;

impl CompletionProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    fn complete<'a>(&'a self, _request: &'a CompletionRequest) -> CompletionFuture<'a, Completion> {
        Box::pin(async move { Ok(Completion::text_only("nya~ hello").with_usage(12, 4)) })
    }

    fn list_models(&self) -> CompletionFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(vec!["deepseek-chat".into(), "deepseek-reasoner".into()]) })
    }
}

async fn test_state() -> (AppState, Arc<SqliteExchangeStore>) {
    let persona = Persona::from_parts("Mika", "calm", "", "", "", "nya").unwrap();
    let session = Arc::new(Session::new(persona, "I am {{ name }}").unwrap());
    let store = Arc::new(SqliteExchangeStore::in_memory().await.unwrap());
    let orchestrator = Orchestrator::new(
        session,
        Arc::new(CannedProvider),
        store.clone(),
        TurnSettings {
            model: "deepseek-chat".into(),
            temperature: 0.7,
            max_tokens: 200,
            timeout: Duration::from_secs(5),
            raw_timeout: Duration::from_secs(5),
        },
        RepliesConfig::default(),
    );
    (AppState::new(Arc::new(orchestrator), "neko"), store)
}

async fn json_body(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn app_state_is_clone() {
    fn assert_clone<T: Clone>() {}
    assert_clone::<AppState>();
}

#[test]
fn default_limits_leave_room_for_inline_images() {
    assert_eq!(DEFAULT_MAX_BODY_BYTES, 16 * 1024 * 1024);
    assert_eq!(DEFAULT_TIMEOUT_MARGIN, Duration::from_secs(30));
}

#[tokio::test]
async fn request_timeout_covers_relay_budget() {
    let (state, _store) = test_state().await;
    assert_eq!(state.request_timeout, Duration::from_secs(35));
}

#[tokio::test]
async fn health_is_static() {
    let (status, body) = json_body(handle_health().await.into_response()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn console_chat_requires_message_or_image() {
    let (state, _store) = test_state().await;
    let response = handle_chat(
        State(state),
        Json(ConsoleChatBody {
            message: Some("   ".into()),
            image: None,
        }),
    )
    .await;

    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn console_chat_replies_and_records() {
    let (state, store) = test_state().await;
    let response = handle_chat(
        State(state.clone()),
        Json(ConsoleChatBody {
            message: Some("hi".into()),
            image: None,
        }),
    )
    .await;

    let (status, body) = json_body(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["reply"], "nya~ hello");
    assert_eq!(store.count_exchanges().await.unwrap(), 1);

    let (_, records) = json_body(
        handle_records(State(state), Query(RecordsQuery { limit: Some(5) })).await,
    )
    .await;
    assert_eq!(records["records"][0]["user_input"], "hi");
}

#[tokio::test]
async fn delete_record_reports_missing_rows() {
    let (state, store) = test_state().await;
    let id = store.append_exchange("q", "a", None).await.unwrap();

    let ok = handle_delete_record(State(state.clone()), Json(DeleteRecordBody { id })).await;
    assert_eq!(ok.status(), StatusCode::OK);

    let missing = handle_delete_record(State(state), Json(DeleteRecordBody { id })).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_first_n_rejects_zero_and_trims_oldest() {
    let (state, store) = test_state().await;
    for i in 0..4 {
        store
            .append_exchange(&format!("q{i}"), "a", None)
            .await
            .unwrap();
    }

    let zero = handle_delete_first_n(State(state.clone()), Json(DeleteFirstNBody { n: 0 })).await;
    assert_eq!(zero.status(), StatusCode::BAD_REQUEST);

    let (_, body) =
        json_body(handle_delete_first_n(State(state), Json(DeleteFirstNBody { n: 3 })).await)
            .await;
    assert_eq!(body["deleted"], 3);
    let remaining = store.recent_exchanges(10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_input, "q3");
}

#[tokio::test]
async fn reset_history_and_usage_reflect_session() {
    let (state, _store) = test_state().await;
    state.orchestrator.respond(TurnInput::text("hello")).await;

    let (_, usage) = json_body(handle_usage(State(state.clone())).await.into_response()).await;
    assert_eq!(usage["input_tokens"], 12);
    assert_eq!(usage["output_tokens"], 4);
    assert_eq!(usage["transcript_len"], 3);
    assert_eq!(usage["persona"], "Mika");

    let (_, reset) = json_body(
        handle_reset_history(State(state.clone()))
            .await
            .into_response(),
    )
    .await;
    assert_eq!(reset["transcript_len"], 1);
}

#[tokio::test]
async fn reload_persona_switches_to_stored_record() {
    let (state, store) = test_state().await;

    let (status, _) = json_body(handle_reload_persona(State(state.clone())).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    state.orchestrator.respond(TurnInput::text("hello")).await;
    let tama = Persona::from_parts("Tama", "sleepy", "", "", "", "mew").unwrap();
    store.save_persona(&tama).await.unwrap();

    let (status, body) = json_body(handle_reload_persona(State(state.clone())).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["persona"], "Tama");
    assert_eq!(body["transcript_len"], 1);
    assert_eq!(
        state.orchestrator.session().transcript().await[0].content(),
        "I am Tama"
    );
}

#[tokio::test]
async fn models_list_reserved_then_upstream_without_duplicates() {
    let (state, _store) = test_state().await;
    let (_, body) = json_body(handle_models(State(state)).await.into_response()).await;

    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["neko", "deepseek-chat", "deepseek-reasoner"]);
    assert_eq!(body["object"], "list");
}
