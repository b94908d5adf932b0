use super::Orchestrator;
use super::types::{ReplyStream, TurnInput, TurnReply};
use crate::core::conversation::Message;
use crate::core::providers::{CompletionRequest, CompletionStream, StreamCollector, StreamEvent};
use crate::error::CompletionError;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How a drained upstream ended.
enum Drained {
    Finished(StreamCollector),
    /// Failure before any text was produced.
    FailedEarly(TurnReply),
    /// Failure after some text already reached the client.
    Interrupted,
}

impl Orchestrator {
    /// Streaming variant of [`Orchestrator::respond`]. The turn is committed
    /// only once the upstream finishes cleanly; an interrupted stream ends
    /// with an apology fragment and leaves the transcript untouched.
    pub fn respond_stream(self: Arc<Self>, input: TurnInput) -> ReplyStream {
        Box::pin(async_stream::stream! {
            let Some(turn) = self.prepare(&input).await else {
                yield self.replies.empty_input.clone();
                return;
            };

            let budget = self.settings.timeout;
            let deadline = Instant::now() + budget;
            let Ok(mut conversation) =
                tokio::time::timeout_at(deadline, self.session.lock_owned()).await
            else {
                yield self.timed_out(budget).text;
                return;
            };
            let request = self.request(
                &self.settings.model,
                conversation.outbound(&turn.staged),
                deadline.saturating_duration_since(Instant::now()),
            );
            let mut upstream = match self.open_stream(&request, deadline, budget).await {
                Ok(upstream) => upstream,
                Err(reply) => {
                    yield reply.text;
                    return;
                }
            };

            let mut collector = StreamCollector::new();
            let drained = loop {
                match tokio::time::timeout_at(deadline, upstream.next()).await {
                    Ok(Some(Ok(event))) => {
                        if let StreamEvent::TextDelta { text } = &event
                            && !text.is_empty()
                        {
                            yield text.clone();
                        }
                        collector.feed(&event);
                    }
                    Ok(None) => break Drained::Finished(collector),
                    Ok(Some(Err(error))) => break self.drain_failure(&collector, self.failure(&error)),
                    Err(_) => break self.drain_failure(&collector, self.timed_out(budget)),
                }
            };

            let collector = match drained {
                Drained::Finished(collector) => collector,
                Drained::FailedEarly(reply) => {
                    yield reply.text;
                    return;
                }
                Drained::Interrupted => {
                    yield self.replies.stream_interrupted.clone();
                    return;
                }
            };

            let usage = collector.usage();
            let text = collector.into_text().trim().to_string();
            if text.is_empty() {
                let reply = self.failure(&CompletionError::Empty {
                    provider: self.completion.name().to_string(),
                });
                yield reply.text;
                return;
            }
            conversation.commit(turn.staged, text.clone());
            drop(conversation);

            if let Some(usage) = usage {
                self.session.usage().record(usage);
            }
            self.persist(&turn.persisted_input, &text, turn.image_description.as_deref())
                .await;
        })
    }

    /// Streaming passthrough relay. Nothing is committed or persisted.
    pub fn relay_stream(self: Arc<Self>, model: String, messages: Vec<Message>) -> ReplyStream {
        Box::pin(async_stream::stream! {
            let budget = self.settings.raw_timeout;
            let deadline = Instant::now() + budget;
            let Ok(conversation) = tokio::time::timeout_at(deadline, self.session.lock()).await
            else {
                yield self.timed_out(budget).text;
                return;
            };
            let outbound = conversation.outbound(&messages);
            drop(conversation);
            let request = self.request(
                &model,
                outbound,
                deadline.saturating_duration_since(Instant::now()),
            );
            let mut upstream = match self.open_stream(&request, deadline, budget).await {
                Ok(upstream) => upstream,
                Err(reply) => {
                    yield reply.text;
                    return;
                }
            };

            let mut collector = StreamCollector::new();
            loop {
                let failure = match tokio::time::timeout_at(deadline, upstream.next()).await {
                    Ok(Some(Ok(event))) => {
                        if let StreamEvent::TextDelta { text } = &event
                            && !text.is_empty()
                        {
                            yield text.clone();
                        }
                        collector.feed(&event);
                        continue;
                    }
                    Ok(None) => break,
                    Ok(Some(Err(error))) => self.failure(&error),
                    Err(_) => self.timed_out(budget),
                };
                match self.drain_failure(&collector, failure) {
                    Drained::FailedEarly(reply) => yield reply.text,
                    _ => yield self.replies.stream_interrupted.clone(),
                }
                return;
            }

            if let Some(usage) = collector.usage() {
                self.session.usage().record(usage);
            }
        })
    }

    async fn open_stream(
        &self,
        request: &CompletionRequest,
        deadline: Instant,
        budget: Duration,
    ) -> Result<CompletionStream, TurnReply> {
        match tokio::time::timeout_at(deadline, self.completion.complete_stream(request)).await {
            Ok(Ok(upstream)) => Ok(upstream),
            Ok(Err(error)) => Err(self.failure(&error)),
            Err(_) => Err(self.timed_out(budget)),
        }
    }

    fn drain_failure(&self, collector: &StreamCollector, reply: TurnReply) -> Drained {
        if collector.text().is_empty() {
            Drained::FailedEarly(reply)
        } else {
            tracing::warn!(
                streamed_chars = collector.text().len(),
                "stream interrupted after partial reply"
            );
            Drained::Interrupted
        }
    }
}
