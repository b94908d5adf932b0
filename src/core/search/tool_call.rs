use super::{SearchFuture, WebSearch};
use crate::core::conversation::Message;
use crate::core::providers::{
    CompletionProvider, CompletionRequest, OpenAiCompatibleProvider, ToolDefinition,
};
use crate::error::{CompletionError, SearchError};
use std::time::Duration;

const WEB_SEARCH_TOOL: &str = "$web_search";
const SEARCH_SYSTEM_PROMPT: &str = "You are Kimi, an AI assistant provided by Moonshot AI.";
const SEARCH_TEMPERATURE: f64 = 0.6;
const SEARCH_MAX_TOKENS: u32 = 32_768;

/// Search through a chat provider that owns a builtin web-search tool.
///
/// The provider asks for `$web_search`; its arguments are echoed back as
/// the tool result and the provider is called once more for the answer.
pub struct ToolCallSearch {
    provider: Box<dyn CompletionProvider>,
    model: String,
    timeout: Duration,
}

impl ToolCallSearch {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        Self::with_provider(
            Box::new(OpenAiCompatibleProvider::new("moonshot", base_url, Some(api_key))),
            model,
            timeout_secs,
        )
    }

    pub fn with_provider(
        provider: Box<dyn CompletionProvider>,
        model: &str,
        timeout_secs: u64,
    ) -> Self {
        Self {
            provider,
            model: model.to_string(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest::new(&self.model, messages, self.timeout)
            .with_temperature(SEARCH_TEMPERATURE)
            .with_max_tokens(SEARCH_MAX_TOKENS)
            .with_tools(vec![ToolDefinition::builtin(WEB_SEARCH_TOOL)])
    }

    async fn search_impl(&self, query: &str) -> Result<String, SearchError> {
        let mut messages = vec![Message::system(SEARCH_SYSTEM_PROMPT), Message::user(query)];

        let first = self
            .provider
            .complete(&self.request(messages.clone()))
            .await
            .map_err(map_completion_error)?;

        if !first.wants_tool_calls() {
            return Err(SearchError::NoResults);
        }

        let search_calls: Vec<_> = first
            .tool_calls
            .iter()
            .filter(|call| call.function.name == WEB_SEARCH_TOOL)
            .collect();
        if search_calls.is_empty() {
            return Err(SearchError::NoResults);
        }

        let mut tool_results = Vec::with_capacity(search_calls.len());
        for call in search_calls {
            let arguments: serde_json::Value = serde_json::from_str(&call.function.arguments)
                .map_err(|e| SearchError::ToolCall(format!("invalid arguments: {e}")))?;
            tool_results.push(Message::Tool {
                content: arguments.to_string(),
                tool_call_id: call.id.clone(),
                name: WEB_SEARCH_TOOL.to_string(),
            });
        }

        messages.push(Message::Assistant {
            content: first.content.clone(),
            tool_calls: first.tool_calls.clone(),
        });
        messages.extend(tool_results);

        let second = self
            .provider
            .complete(&self.request(messages))
            .await
            .map_err(map_completion_error)?;

        if second.wants_tool_calls() {
            return Err(SearchError::ToolCall(
                "provider requested another tool round".into(),
            ));
        }

        let answer = second.content.trim();
        if answer.is_empty() {
            return Err(SearchError::NoResults);
        }
        Ok(answer.to_string())
    }
}

fn map_completion_error(err: CompletionError) -> SearchError {
    match err {
        CompletionError::Status {
            status, message, ..
        } => SearchError::Status { status, message },
        other => SearchError::Request(other.to_string()),
    }
}

impl WebSearch for ToolCallSearch {
    fn name(&self) -> &str {
        "tool_call"
    }

    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a> {
        Box::pin(self.search_impl(query))
    }
}
