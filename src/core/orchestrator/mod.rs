//! Turn orchestration: augmentation, completion, commit, persistence.
//!
//! Every persona turn holds the session's conversation lock from the moment
//! the outbound transcript is built until the reply is committed, so two
//! concurrent turns can never interleave their messages. Vision and search
//! run before the lock is taken. Time spent queued on the lock counts
//! against the turn's completion budget.

mod augment;
mod stream;
mod types;


pub use types::{ReplyStream, TurnInput, TurnOutcome, TurnReply, TurnSettings};

use crate::config::{Config, RepliesConfig};
use crate::core::conversation::Message;
use crate::core::providers::{
    Completion, CompletionProvider, CompletionRequest, scrub_secret_patterns,
};
use crate::core::search::WebSearch;
use crate::core::session::Session;
use crate::core::vision::ImageDescriber;
use crate::error::CompletionError;
use crate::storage::ExchangeStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub struct Orchestrator {
    session: Arc<Session>,
    completion: Arc<dyn CompletionProvider>,
    describer: Option<Arc<dyn ImageDescriber>>,
    search: Option<Arc<dyn WebSearch>>,
    store: Arc<dyn ExchangeStore>,
    settings: TurnSettings,
    replies: RepliesConfig,
}

impl TurnSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.default_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.request_timeout_secs),
            raw_timeout: Duration::from_secs(config.raw_request_timeout_secs),
        }
    }
}

impl Orchestrator {
    pub fn new(
        session: Arc<Session>,
        completion: Arc<dyn CompletionProvider>,
        store: Arc<dyn ExchangeStore>,
        settings: TurnSettings,
        replies: RepliesConfig,
    ) -> Self {
        Self {
            session,
            completion,
            describer: None,
            search: None,
            store,
            settings,
            replies,
        }
    }

    #[must_use]
    pub fn with_describer(mut self, describer: Option<Arc<dyn ImageDescriber>>) -> Self {
        self.describer = describer;
        self
    }

    #[must_use]
    pub fn with_search(mut self, search: Option<Arc<dyn WebSearch>>) -> Self {
        self.search = search;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn ExchangeStore> {
        &self.store
    }

    pub fn completion(&self) -> &Arc<dyn CompletionProvider> {
        &self.completion
    }

    pub fn settings(&self) -> &TurnSettings {
        &self.settings
    }

    /// Run one persona turn to completion.
    pub async fn respond(&self, input: TurnInput) -> TurnReply {
        let Some(turn) = self.prepare(&input).await else {
            return TurnReply::canned(&self.replies.empty_input, TurnOutcome::EmptyInput);
        };

        let budget = self.settings.timeout;
        let deadline = Instant::now() + budget;
        let Ok(mut conversation) = tokio::time::timeout_at(deadline, self.session.lock()).await
        else {
            return self.timed_out(budget);
        };
        let request = self.request(
            &self.settings.model,
            conversation.outbound(&turn.staged),
            deadline.saturating_duration_since(Instant::now()),
        );
        let completion = match self.complete_within(&request, deadline, budget).await {
            Ok(completion) => completion,
            Err(reply) => return reply,
        };

        let text = completion.content.trim().to_string();
        if text.is_empty() {
            return self.failure(&CompletionError::Empty {
                provider: self.completion.name().to_string(),
            });
        }
        conversation.commit(turn.staged, text.clone());
        drop(conversation);

        if let Some(usage) = completion.usage {
            self.session.usage().record(usage);
        }
        self.persist(
            &turn.persisted_input,
            &text,
            turn.image_description.as_deref(),
        )
        .await;
        TurnReply::completed(text, completion.usage)
    }

    /// Forward a client transcript for a non-persona model. The session
    /// transcript is prepended but never modified.
    pub async fn relay(&self, model: &str, messages: &[Message]) -> TurnReply {
        let budget = self.settings.raw_timeout;
        let deadline = Instant::now() + budget;
        let Ok(conversation) = tokio::time::timeout_at(deadline, self.session.lock()).await else {
            return self.timed_out(budget);
        };
        let outbound = conversation.outbound(messages);
        drop(conversation);
        let request = self.request(
            model,
            outbound,
            deadline.saturating_duration_since(Instant::now()),
        );
        match self.complete_within(&request, deadline, budget).await {
            Ok(completion) => {
                if let Some(usage) = completion.usage {
                    self.session.usage().record(usage);
                }
                TurnReply::completed(completion.content, completion.usage)
            }
            Err(reply) => reply,
        }
    }

    fn request(&self, model: &str, messages: Vec<Message>, timeout: Duration) -> CompletionRequest {
        CompletionRequest::new(model, messages, timeout)
            .with_temperature(self.settings.temperature)
            .with_max_tokens(self.settings.max_tokens)
    }

    async fn complete_within(
        &self,
        request: &CompletionRequest,
        deadline: Instant,
        budget: Duration,
    ) -> Result<Completion, TurnReply> {
        match tokio::time::timeout_at(deadline, self.completion.complete(request)).await {
            Ok(Ok(completion)) => Ok(completion),
            Ok(Err(error)) => Err(self.failure(&error)),
            Err(_) => Err(self.timed_out(budget)),
        }
    }

    fn timed_out(&self, budget: Duration) -> TurnReply {
        tracing::warn!(
            provider = self.completion.name(),
            timeout_secs = budget.as_secs(),
            "completion timed out"
        );
        TurnReply::canned(&self.replies.timeout, TurnOutcome::TimedOut)
    }

    fn failure(&self, error: &CompletionError) -> TurnReply {
        if error.is_timeout() {
            return TurnReply::canned(&self.replies.timeout, TurnOutcome::TimedOut);
        }
        tracing::warn!(%error, "completion failed");
        let detail = error.to_string();
        TurnReply::canned(
            &self.replies.render_error(&scrub_secret_patterns(&detail)),
            TurnOutcome::Failed,
        )
    }

    /// Storage failures are logged, never surfaced to the client.
    async fn persist(&self, user_input: &str, reply: &str, image_description: Option<&str>) {
        if let Err(error) = self
            .store
            .append_exchange(user_input, reply, image_description)
            .await
        {
            tracing::error!(%error, "failed to persist exchange");
        }
    }
}
