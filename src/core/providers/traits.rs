use super::streaming::{CompletionStream, StreamEvent};
use super::types::{Completion, CompletionRequest};
use crate::error::CompletionError;
use std::future::Future;
use std::pin::Pin;

pub type CompletionFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, CompletionError>> + Send + 'a>>;

/// A remote chat-completion service.
pub trait CompletionProvider: Send + Sync {
    /// Provider identifier used in logs and errors.
    fn name(&self) -> &str;

    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a, Completion>;

    /// Stream a completion. The default issues a blocking call and replays
    /// it as a single delta.
    fn complete_stream<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> CompletionFuture<'a, CompletionStream> {
        Box::pin(async move {
            let completion = self.complete(request).await?;
            let events = vec![
                Ok(StreamEvent::TextDelta {
                    text: completion.content,
                }),
                Ok(StreamEvent::Done {
                    finish_reason: Some(completion.finish_reason),
                    usage: completion.usage,
                }),
            ];
            let stream: CompletionStream = Box::pin(futures_util::stream::iter(events));
            Ok(stream)
        })
    }

    fn list_models(&self) -> CompletionFuture<'_, Vec<String>> {
        Box::pin(async move { Ok(Vec::new()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::streaming::collect_stream;
    use std::time::Duration;

    struct Fixed;

    impl CompletionProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn complete<'a>(
            &'a self,
            _request: &'a CompletionRequest,
        ) -> CompletionFuture<'a, Completion> {
            Box::pin(async move { Ok(Completion::text_only("meow").with_usage(4, 1)) })
        }
    }

    #[tokio::test]
    async fn default_stream_replays_blocking_completion() {
        let request = CompletionRequest::new("m", Vec::new(), Duration::from_secs(1));
        let stream = Fixed.complete_stream(&request).await.unwrap();
        let collected = collect_stream(stream).await.unwrap();
        assert_eq!(collected.text(), "meow");
        assert_eq!(collected.usage().map(|u| u.input_tokens), Some(4));
    }

    #[tokio::test]
    async fn default_model_list_is_empty() {
        assert!(Fixed.list_models().await.unwrap().is_empty());
    }
}
