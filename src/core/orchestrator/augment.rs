use super::Orchestrator;
use super::types::{IMAGE_ONLY_PLACEHOLDER, IMAGE_ONLY_RECORD, PreparedTurn, TurnInput};
use crate::core::conversation::Message;
use crate::core::search::should_search;
use crate::core::vision::ImageInput;

impl Orchestrator {
    /// Build the staged user messages. `None` when there is nothing to send.
    ///
    /// Vision and search failures degrade to the raw input; they never fail
    /// the turn.
    pub(super) async fn prepare(&self, input: &TurnInput) -> Option<PreparedTurn> {
        if input.is_empty() {
            return None;
        }

        let mut staged = Vec::with_capacity(2);
        let image_description = match &input.image {
            Some(image) => self.describe(image).await,
            None => None,
        };
        if let Some(description) = &image_description {
            staged.push(Message::user(format!("[image content]: {description}")));
        }

        match input.text.as_deref() {
            Some(text) => staged.push(Message::user(self.augment_text(text).await)),
            None => staged.push(Message::user(IMAGE_ONLY_PLACEHOLDER)),
        }

        Some(PreparedTurn {
            staged,
            persisted_input: input
                .text
                .clone()
                .unwrap_or_else(|| IMAGE_ONLY_RECORD.to_string()),
            image_description,
        })
    }

    async fn describe(&self, image: &ImageInput) -> Option<String> {
        let Some(describer) = &self.describer else {
            tracing::debug!("vision not configured; ignoring image");
            return None;
        };
        match describer.describe(image).await {
            Ok(description) => Some(description),
            Err(error) => {
                tracing::warn!(%error, "image description failed");
                None
            }
        }
    }

    async fn augment_text(&self, text: &str) -> String {
        if !should_search(Some(text)) {
            return text.to_string();
        }
        let Some(search) = &self.search else {
            return text.to_string();
        };
        match search.search(text).await {
            Ok(block) => {
                tracing::debug!(backend = search.name(), "search augmentation attached");
                format!("user question: {text}\n{block}")
            }
            Err(error) => {
                tracing::warn!(backend = search.name(), %error, "search failed; sending raw text");
                text.to_string()
            }
        }
    }
}
