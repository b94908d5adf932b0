use crate::core::conversation::Message;
use crate::core::orchestrator::TurnInput;
use crate::core::providers::Usage;
use crate::transport::gateway::AppState;
use crate::transport::gateway::openai_compat_streaming::build_sse_response;
use crate::transport::gateway::openai_compat_types::{
    ChatCompletion, ChatCompletionRequest, Choice, ChoiceMessage, CompletionUsage, ModelEntry,
    ModelList, RequestMessage,
};
use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// POST /v1/chat/completions
pub async fn handle_chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Response {
    if request.model.is_empty() || request.model == state.reserved_model {
        persona_completion(&state, request).await
    } else {
        relay_completion(&state, request).await
    }
}

/// POST /v1/unified/chat/completions: persona pipeline whatever the model.
pub async fn handle_unified_chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionRequest>,
) -> Response {
    persona_completion(&state, request).await
}

/// GET /v1/models
pub async fn handle_models(State(state): State<AppState>) -> impl IntoResponse {
    let orchestrator = &state.orchestrator;
    let owner = orchestrator.completion().name().to_string();
    let mut data = vec![
        ModelEntry::new(&state.reserved_model, "nekorelay"),
        ModelEntry::new(&orchestrator.settings().model, &owner),
    ];
    match orchestrator.completion().list_models().await {
        Ok(models) => {
            for id in models {
                if data.iter().all(|entry| entry.id != id) {
                    data.push(ModelEntry::new(id, &owner));
                }
            }
        }
        Err(error) => tracing::warn!(%error, "upstream model listing failed"),
    }
    Json(ModelList {
        object: "list",
        data,
    })
}

async fn persona_completion(state: &AppState, request: ChatCompletionRequest) -> Response {
    let input = turn_input(&request.messages);
    let model = if request.model.is_empty() {
        state.reserved_model.clone()
    } else {
        request.model
    };

    if request.stream.unwrap_or(false) {
        let fragments = Arc::clone(&state.orchestrator).respond_stream(input);
        return build_sse_response(fragments).into_response();
    }

    let reply = state.orchestrator.respond(input).await;
    completion_response(model, reply.text, reply.usage)
}

async fn relay_completion(state: &AppState, request: ChatCompletionRequest) -> Response {
    let messages = relay_messages(&request.messages);

    if request.stream.unwrap_or(false) {
        let fragments = Arc::clone(&state.orchestrator).relay_stream(request.model, messages);
        return build_sse_response(fragments).into_response();
    }

    let reply = state.orchestrator.relay(&request.model, &messages).await;
    completion_response(request.model, reply.text, reply.usage)
}

fn completion_response(model: String, content: String, usage: Option<Usage>) -> Response {
    let created = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs());
    Json(ChatCompletion {
        id: format!("chatcmpl-{}", uuid::Uuid::new_v4()),
        object: "chat.completion".to_string(),
        created,
        model,
        choices: vec![Choice {
            index: 0,
            message: ChoiceMessage {
                role: "assistant".to_string(),
                content,
            },
            finish_reason: "stop".to_string(),
        }],
        usage: usage.map(|usage| CompletionUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
        }),
    })
    .into_response()
}

/// The last user message is the turn; earlier ones are already in the
/// session transcript.
fn turn_input(messages: &[RequestMessage]) -> TurnInput {
    messages
        .iter()
        .rev()
        .find(|message| message.role == "user")
        .map(|message| {
            let text = message.content.text();
            TurnInput::new(Some(&text), message.content.image())
        })
        .unwrap_or_default()
}

fn relay_messages(messages: &[RequestMessage]) -> Vec<Message> {
    messages
        .iter()
        .filter_map(|message| {
            let content = message.content.text();
            match message.role.as_str() {
                "system" => Some(Message::system(content)),
                "user" => Some(Message::user(content)),
                "assistant" => Some(Message::assistant(content)),
                other => {
                    tracing::debug!(role = other, "dropping unsupported relay message");
                    None
                }
            }
        })
        .collect()
}
