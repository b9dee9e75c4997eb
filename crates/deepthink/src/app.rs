//! Conversation state for the session.

use chat_api::ChatMessage;

/// Completed user/assistant turns, oldest first.
///
/// Only finished turns live here; system prompts and the in-flight question
/// are assembled per request by the pipeline.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Appends one completed turn: the question, then its answer.
    pub fn record_turn(&mut self, question: &str, answer: &str) {
        self.messages.push(ChatMessage::user(question));
        self.messages.push(ChatMessage::assistant(answer));
    }

    /// Drops every recorded turn.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    /// Completed question/answer rounds.
    #[must_use]
    pub fn rounds(&self) -> usize {
        self.messages.len() / 2
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
