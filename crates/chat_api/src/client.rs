use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::events::{ChatChunk, ChatCompletion};
use crate::payload::ChatRequest;
use crate::sse::{SseEvent, SseStreamParser};
use crate::url::normalize_chat_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct ChatClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        if config.api_key.trim().is_empty() {
            return Err(ChatApiError::MissingApiKey);
        }
        if reqwest::Url::parse(&normalize_chat_url(&config.base_url)).is_err() {
            return Err(ChatApiError::InvalidBaseUrl(config.base_url));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_request(&self, request: &ChatRequest, stream: bool) -> reqwest::RequestBuilder {
        let mut payload = request.clone();
        payload.stream = stream;
        self.http
            .post(self.normalized_endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&payload)
    }

    async fn send(
        &self,
        request: &ChatRequest,
        stream: bool,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<reqwest::Response, ChatApiError> {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        let response = self.build_request(request, stream).send();
        let response = await_or_cancel(response, cancellation)
            .await?
            .map_err(ChatApiError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = await_or_cancel(response.text(), cancellation)
                .await?
                .unwrap_or_default();
            return Err(ChatApiError::Status(
                status,
                parse_error_message(status, &body),
            ));
        }

        Ok(response)
    }

    /// Sends a buffered completion and returns the first choice's content.
    pub async fn complete(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<String, ChatApiError> {
        let response = self.send(request, false, cancellation).await?;
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .map_err(ChatApiError::from)?;
        let completion: ChatCompletion = serde_json::from_str(&body)?;
        completion
            .content()
            .map(ToOwned::to_owned)
            .ok_or(ChatApiError::EmptyCompletion)
    }

    /// Streams a completion, invoking `on_delta` for every content fragment,
    /// and returns the accumulated text once the server signals completion.
    ///
    /// A stream that closes without a `[DONE]` sentinel or a finish reason
    /// fails with [`ChatApiError::StreamEndedEarly`] carrying whatever text
    /// arrived; the deltas already handed to `on_delta` are the caller's to
    /// keep.
    pub async fn stream<F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_delta: F,
    ) -> Result<String, ChatApiError>
    where
        F: FnMut(&str),
    {
        let response = self.send(request, true, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = SseStreamParser::default();
        let mut progress = StreamProgress::default();

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }
            let chunk = chunk.map_err(ChatApiError::from)?;
            for event in parser.feed(&chunk) {
                apply_sse_event(event, &mut progress, &mut on_delta);
            }
        }

        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }
        if !progress.finished {
            return Err(ChatApiError::StreamEndedEarly {
                partial: progress.accumulated,
            });
        }

        Ok(progress.accumulated)
    }
}

#[derive(Debug, Default)]
struct StreamProgress {
    accumulated: String,
    finished: bool,
}

fn apply_sse_event<F>(event: SseEvent, progress: &mut StreamProgress, on_delta: &mut F)
where
    F: FnMut(&str),
{
    match event {
        SseEvent::Done => progress.finished = true,
        SseEvent::Data(payload) => {
            // Malformed frames are skipped rather than failing the stream.
            let Ok(chunk) = serde_json::from_str::<ChatChunk>(&payload) else {
                return;
            };
            if chunk.finish_reason().is_some() {
                progress.finished = true;
            }
            if let Some(delta) = chunk.delta_content() {
                if !delta.is_empty() {
                    progress.accumulated.push_str(delta);
                    on_delta(delta);
                }
            }
        }
    }
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, ChatApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(ChatApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(ChatApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
