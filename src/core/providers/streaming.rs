use super::types::{FinishReason, Usage};
use crate::error::CompletionError;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;

pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<StreamEvent, CompletionError>> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    TextDelta {
        text: String,
    },
    Done {
        finish_reason: Option<FinishReason>,
        usage: Option<Usage>,
    },
}

/// Folds stream events back into a full reply.
#[derive(Debug, Default)]
pub struct StreamCollector {
    text: String,
    usage: Option<Usage>,
    finish_reason: Option<FinishReason>,
}

impl StreamCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, event: &StreamEvent) {
        match event {
            StreamEvent::TextDelta { text } => self.text.push_str(text),
            StreamEvent::Done {
                finish_reason,
                usage,
            } => {
                if finish_reason.is_some() {
                    self.finish_reason.clone_from(finish_reason);
                }
                if usage.is_some() {
                    self.usage = *usage;
                }
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    pub fn finish_reason(&self) -> Option<&FinishReason> {
        self.finish_reason.as_ref()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

/// Drain a stream into its full text. Used by callers that asked for a
/// stream but need the whole reply.
pub async fn collect_stream(
    mut stream: CompletionStream,
) -> Result<StreamCollector, CompletionError> {
    let mut collector = StreamCollector::new();
    while let Some(event) = stream.next().await {
        collector.feed(&event?);
    }
    Ok(collector)
}
