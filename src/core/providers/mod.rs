pub mod compatible;
pub mod factory;
pub mod http_client;
mod openai_types;
pub mod scrub;
pub mod sse;
pub mod streaming;
pub mod traits;
pub mod types;

pub use compatible::OpenAiCompatibleProvider;
pub use factory::create_completion_provider;
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use streaming::{CompletionStream, StreamCollector, StreamEvent, collect_stream};
pub use traits::{CompletionFuture, CompletionProvider};
pub use types::{
    Completion, CompletionRequest, FinishReason, ToolCall, ToolCallFunction, ToolDefinition,
    ToolFunction, Usage,
};
