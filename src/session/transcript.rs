//! Append-only conversation transcript.

use crate::llm::{Message, Role};

/// The ordered history of turns exchanged with the completion service.
///
/// Append-only for the lifetime of a session: turns are never edited or
/// removed. The system message exists exactly once, as the first element,
/// because [`Transcript::seeded`] is the only constructor and the push
/// methods only accept user and assistant turns.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Start a transcript with the system persona as its only turn.
    pub fn seeded(persona: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(persona)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Turns visible to the interactive surface. The system seed is never
    /// rendered.
    pub fn rendered(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }
}
