//! Two-stage request flow: a buffered analysis pass, then a streamed
//! answer pass grounded in the analysis.

use std::time::{Duration, Instant};

use chat_api::{CancellationSignal, ChatApiError, ChatClient, ChatMessage, ChatRequest};

/// Sampling for the analysis pass: low temperature, bounded length.
pub const THINK_TEMPERATURE: f64 = 0.3;
pub const THINK_MAX_TOKENS: u32 = 1500;

/// Sampling for the answer pass.
pub const ANSWER_TEMPERATURE: f64 = 0.7;
pub const ANSWER_MAX_TOKENS: u32 = 4096;

/// System prompt for the analysis pass.
const THINK_SYSTEM_PROMPT: &str = "You are the analysis stage of a two-pass assistant. \
Break the question down before anyone answers it: restate what is actually being asked, \
list the relevant facts and constraints, and sketch a sound approach. \
Produce the analysis only; do not write the final answer.";

/// System prompt scaffold for the answer pass; the analysis text is
/// appended after a newline.
const ANSWER_SYSTEM_PROMPT: &str = "You are the answer stage of a two-pass assistant. \
An analysis of the question follows. Build on it where it helps and answer \
the user directly.";

/// Drives both passes against one model.
pub struct Pipeline {
    client: ChatClient,
    model: String,
}

/// Analysis text plus how long the model took to produce it.
#[derive(Debug)]
pub struct ThinkOutcome {
    pub analysis: String,
    pub elapsed: Duration,
}

impl Pipeline {
    pub fn new(client: ChatClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Buffered analysis pass.
    pub async fn think(
        &self,
        history: &[ChatMessage],
        question: &str,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<ThinkOutcome, ChatApiError> {
        let request = self.think_request(history, question);
        let started = Instant::now();
        let analysis = self.client.complete(&request, cancellation).await?;
        Ok(ThinkOutcome {
            analysis,
            elapsed: started.elapsed(),
        })
    }

    /// Streamed answer pass; each delta reaches `on_delta` as it arrives
    /// and the full answer is returned at the end.
    pub async fn answer<F>(
        &self,
        history: &[ChatMessage],
        analysis: &str,
        question: &str,
        cancellation: Option<&CancellationSignal>,
        on_delta: F,
    ) -> Result<String, ChatApiError>
    where
        F: FnMut(&str),
    {
        let request = self.answer_request(history, analysis, question);
        self.client.stream(&request, cancellation, on_delta).await
    }

    /// Request for the analysis pass: system prompt, prior turns, then the
    /// bare question.
    pub fn think_request(&self, history: &[ChatMessage], question: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(THINK_SYSTEM_PROMPT));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(question));

        ChatRequest::new(self.model.as_str(), messages)
            .with_temperature(THINK_TEMPERATURE)
            .with_max_tokens(THINK_MAX_TOKENS)
    }

    /// Request for the answer pass: the analysis rides in the system
    /// prompt and the question is restated against it.
    pub fn answer_request(
        &self,
        history: &[ChatMessage],
        analysis: &str,
        question: &str,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(format!(
            "{ANSWER_SYSTEM_PROMPT}\n{analysis}"
        )));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(format!(
            "Based on the analysis above, answer: {question}"
        )));

        ChatRequest::new(self.model.as_str(), messages)
            .with_temperature(ANSWER_TEMPERATURE)
            .with_max_tokens(ANSWER_MAX_TOKENS)
    }
}
