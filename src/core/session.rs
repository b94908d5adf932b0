use crate::core::conversation::{ConversationState, Message};
use crate::core::persona::{Persona, render_system_prompt};
use crate::core::usage::TokenUsage;
use crate::error::ConfigError;
use arc_swap::ArcSwap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

/// The single conversation a running relay serves.
///
/// Holding the conversation lock is what makes a turn atomic: the
/// orchestrator keeps it from building the outbound transcript until the
/// reply is committed (or discarded).
pub struct Session {
    conversation: Arc<Mutex<ConversationState>>,
    persona: ArcSwap<Persona>,
    template: String,
    usage: TokenUsage,
    started_at: Instant,
}

impl Session {
    pub fn new(persona: Persona, template: &str) -> Result<Self, ConfigError> {
        let prompt = render_system_prompt(template, &persona)?;
        Ok(Self {
            conversation: Arc::new(Mutex::new(ConversationState::new(prompt))),
            persona: ArcSwap::from_pointee(persona),
            template: template.to_string(),
            usage: TokenUsage::new(),
            started_at: Instant::now(),
        })
    }

    pub fn persona(&self) -> Arc<Persona> {
        self.persona.load_full()
    }

    pub fn usage(&self) -> &TokenUsage {
        &self.usage
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub async fn lock(&self) -> MutexGuard<'_, ConversationState> {
        self.conversation.lock().await
    }

    /// Guard that can live inside a `'static` stream.
    pub async fn lock_owned(&self) -> OwnedMutexGuard<ConversationState> {
        Arc::clone(&self.conversation).lock_owned().await
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.lock().await.messages().to_vec()
    }

    pub async fn transcript_len(&self) -> usize {
        self.lock().await.len()
    }

    /// Back to just the system message.
    pub async fn reset_history(&self) {
        self.lock().await.reset();
        tracing::info!("conversation history reset");
    }

    /// Switch persona: re-render the system prompt and drop the history.
    pub async fn reinitialize(&self, persona: Persona) -> Result<(), ConfigError> {
        let prompt = render_system_prompt(&self.template, &persona)?;
        let mut conversation = self.lock().await;
        conversation.reseed(prompt);
        tracing::info!(persona = %persona.name, "session reinitialized");
        self.persona.store(Arc::new(persona));
        Ok(())
    }
}
