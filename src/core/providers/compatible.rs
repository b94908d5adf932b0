//! OpenAI-compatible chat completions client.
//! DeepSeek, Moonshot and most hosted LLM APIs speak this format.

use super::openai_types::{ChatCompletionChunk, ChatRequest, ChatResponse, ModelList, StreamOptions};
use super::scrub::{read_error_body, sanitize_api_error};
use super::sse::{SseBuffer, SseData, parse_data_lines};
use super::streaming::{CompletionStream, StreamEvent};
use super::traits::{CompletionFuture, CompletionProvider};
use super::types::{Completion, CompletionRequest, FinishReason, Usage};
use super::build_provider_client;
use crate::error::CompletionError;
use futures_util::StreamExt;
use reqwest::Client;

pub struct OpenAiCompatibleProvider {
    name: String,
    api_key: Option<String>,
    /// Pre-computed chat completions URL.
    chat_url: String,
    models_url: String,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let (chat_url, root) = match base_url.strip_suffix("/chat/completions") {
            Some(root) => (base_url.to_string(), root),
            None => (format!("{base_url}/chat/completions"), base_url),
        };

        Self {
            name: name.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(ToString::to_string),
            chat_url,
            models_url: format!("{root}/models"),
            client: build_provider_client(),
        }
    }

    pub fn chat_url(&self) -> &str {
        &self.chat_url
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    fn map_send_error(&self, err: &reqwest::Error, request: &CompletionRequest) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout {
                provider: self.name.clone(),
                timeout_secs: request.timeout.as_secs(),
            }
        } else {
            CompletionError::Request {
                provider: self.name.clone(),
                message: sanitize_api_error(&err.to_string()),
            }
        }
    }

    fn wire_request<'a>(request: &'a CompletionRequest, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: (!request.tools.is_empty()).then_some(request.tools.as_slice()),
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        stream: bool,
    ) -> Result<reqwest::Response, CompletionError> {
        let mut builder = self
            .authorized(self.client.post(&self.chat_url))
            .json(&Self::wire_request(request, stream));
        if !stream {
            builder = builder.timeout(request.timeout);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(&e, request))?;

        if !response.status().is_success() {
            let (status, message) = read_error_body(response).await;
            return Err(CompletionError::Status {
                provider: self.name.clone(),
                status,
                message,
            });
        }

        Ok(response)
    }

    async fn complete_impl(
        &self,
        request: &CompletionRequest,
    ) -> Result<Completion, CompletionError> {
        let response = self.send(request, false).await?;
        let body: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.map_send_error(&e, request)
            } else {
                CompletionError::Decode {
                    provider: self.name.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let ChatResponse {
            choices,
            usage,
            model,
        } = body;
        let choice = choices.into_iter().next().ok_or_else(|| CompletionError::Empty {
            provider: self.name.clone(),
        })?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            finish_reason: FinishReason::from_wire(choice.finish_reason.as_deref()),
            tool_calls: choice.message.tool_calls,
            usage: usage.map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            }),
            model,
        })
    }

    async fn stream_impl(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionStream, CompletionError> {
        let response = self.send(request, true).await?;
        let mut byte_stream = response.bytes_stream();
        let provider = self.name.clone();

        let stream = async_stream::try_stream! {
            let mut sse_buffer = SseBuffer::new();
            let mut finished = false;

            'outer: loop {
                let block = match sse_buffer.next_event_block() {
                    Some(block) => block,
                    None => match byte_stream.next().await {
                        Some(chunk) => {
                            let chunk = chunk.map_err(|e| CompletionError::Streaming {
                                provider: provider.clone(),
                                message: e.to_string(),
                            })?;
                            sse_buffer.push_chunk(&chunk);
                            continue;
                        }
                        None => match sse_buffer.take_remainder() {
                            Some(rest) => rest,
                            None => break,
                        },
                    },
                };

                for data in parse_data_lines(&block) {
                    let payload = match data {
                        SseData::Done => break 'outer,
                        SseData::Payload(payload) => payload,
                    };
                    let Ok(chunk) = serde_json::from_str::<ChatCompletionChunk>(payload) else {
                        tracing::debug!(provider = %provider, "skipping undecodable stream chunk");
                        continue;
                    };

                    let usage = chunk.usage.as_ref().map(|u| Usage {
                        input_tokens: u.prompt_tokens,
                        output_tokens: u.completion_tokens,
                    });

                    let usage_only = chunk.choices.is_empty();
                    for choice in chunk.choices {
                        if let Some(text) = choice.delta.content
                            && !text.is_empty()
                        {
                            yield StreamEvent::TextDelta { text };
                        }
                        if let Some(reason) = choice.finish_reason.as_deref() {
                            finished = true;
                            yield StreamEvent::Done {
                                finish_reason: Some(FinishReason::from_wire(Some(reason))),
                                usage,
                            };
                        }
                    }

                    // Usage-only trailer sent after the finish chunk.
                    if usage_only && usage.is_some() {
                        finished = true;
                        yield StreamEvent::Done {
                            finish_reason: None,
                            usage,
                        };
                    }
                }
            }

            if !finished {
                yield StreamEvent::Done {
                    finish_reason: None,
                    usage: None,
                };
            }
        };

        Ok(Box::pin(stream))
    }

    async fn list_models_impl(&self) -> Result<Vec<String>, CompletionError> {
        let response = self
            .authorized(self.client.get(&self.models_url))
            .timeout(std::time::Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| CompletionError::Request {
                provider: self.name.clone(),
                message: sanitize_api_error(&e.to_string()),
            })?;

        if !response.status().is_success() {
            let (status, message) = read_error_body(response).await;
            return Err(CompletionError::Status {
                provider: self.name.clone(),
                status,
                message,
            });
        }

        let list: ModelList = response.json().await.map_err(|e| CompletionError::Decode {
            provider: self.name.clone(),
            message: e.to_string(),
        })?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

impl CompletionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a, Completion> {
        Box::pin(self.complete_impl(request))
    }

    fn complete_stream<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> CompletionFuture<'a, CompletionStream> {
        Box::pin(self.stream_impl(request))
    }

    fn list_models(&self) -> CompletionFuture<'_, Vec<String>> {
        Box::pin(self.list_models_impl())
    }
}
