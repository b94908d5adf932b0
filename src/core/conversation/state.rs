use super::message::Message;

/// Ordered transcript replayed to the completion provider.
///
/// Element 0 is always the persona system message. Turns are applied
/// atomically through [`ConversationState::commit`]: the staged user-side
/// messages and the assistant reply land together or not at all.
#[derive(Debug, Clone)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true: the system message is always present.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn system_prompt(&self) -> &str {
        self.messages.first().map_or("", Message::content)
    }

    /// Transcript plus not-yet-committed messages, as sent upstream.
    pub fn outbound(&self, staged: &[Message]) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.messages.len() + staged.len());
        out.extend_from_slice(&self.messages);
        out.extend(staged.iter().filter(|m| !m.is_system()).cloned());
        out
    }

    /// Append a completed turn. System messages in `staged` are dropped so
    /// element 0 stays unique.
    pub fn commit(&mut self, staged: Vec<Message>, reply: impl Into<String>) {
        self.messages.extend(staged.into_iter().filter(|m| !m.is_system()));
        self.messages.push(Message::assistant(reply));
    }

    /// Drop everything but the system message.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
    }

    /// Replace the system prompt and drop the history.
    pub fn reseed(&mut self, system_prompt: impl Into<String>) {
        self.messages.clear();
        self.messages.push(Message::system(system_prompt));
    }
}
