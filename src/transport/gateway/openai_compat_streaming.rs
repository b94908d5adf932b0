use crate::core::orchestrator::ReplyStream;
use crate::transport::gateway::openai_compat_types::ChatCompletionChunk;
use axum::response::sse::{Event, Sse};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;

/// Relay reply fragments as `data:` events, closed by `data: [DONE]`.
pub fn build_sse_response(
    mut fragments: ReplyStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = async_stream::stream! {
        while let Some(fragment) = fragments.next().await {
            match serde_json::to_string(&ChatCompletionChunk::fragment(fragment)) {
                Ok(data) => yield Ok(Event::default().data(data)),
                Err(error) => tracing::warn!(%error, "failed to encode stream chunk"),
            }
        }
        yield Ok(Event::default().data("[DONE]"));
    };
    Sse::new(events)
}
