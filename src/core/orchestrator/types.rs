use crate::core::providers::Usage;
use crate::core::vision::ImageInput;
use crate::core::conversation::Message;
use futures_util::Stream;
use std::pin::Pin;
use std::time::Duration;

/// Reply fragments as they should reach the client. Failures are already
/// folded into persona-voiced text.
pub type ReplyStream = Pin<Box<dyn Stream<Item = String> + Send + 'static>>;

/// One user turn as received from a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnInput {
    pub text: Option<String>,
    pub image: Option<ImageInput>,
}

impl TurnInput {
    /// Blank text and blank image references count as absent.
    pub fn new(text: Option<&str>, image: Option<&str>) -> Self {
        Self {
            text: text
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            image: image.and_then(ImageInput::from_reference),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(Some(text), None)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.image.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Completed,
    EmptyInput,
    TimedOut,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub text: String,
    pub outcome: TurnOutcome,
    pub usage: Option<Usage>,
}

impl TurnReply {
    pub(super) fn completed(text: String, usage: Option<Usage>) -> Self {
        Self {
            text,
            outcome: TurnOutcome::Completed,
            usage,
        }
    }

    pub(super) fn canned(text: &str, outcome: TurnOutcome) -> Self {
        Self {
            text: text.to_string(),
            outcome,
            usage: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == TurnOutcome::Completed
    }
}

/// Completion parameters shared by every turn.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Budget for persona turns.
    pub timeout: Duration,
    /// Budget for passthrough relays.
    pub raw_timeout: Duration,
}

/// User-side messages for a turn, built before the conversation lock is
/// taken.
#[derive(Debug, Clone)]
pub(super) struct PreparedTurn {
    pub staged: Vec<Message>,
    /// Stored in place of the text when the turn was image-only.
    pub persisted_input: String,
    pub image_description: Option<String>,
}

pub(super) const IMAGE_ONLY_PLACEHOLDER: &str = "[user sent an image]";
pub(super) const IMAGE_ONLY_RECORD: &str = "[image]";
