//! Transport-only client for OpenAI-compatible chat-completion endpoints.
//!
//! This crate owns request building, response parsing, and SSE stream
//! normalization for the `/chat/completions` wire contract. It carries no
//! conversation state and no rendering coupling; callers own history,
//! prompts, and what to do with each streamed delta.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod payload;
pub mod sse;
pub mod url;

pub use client::{CancellationSignal, ChatClient};
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use events::{ChatChunk, ChatCompletion};
pub use payload::{ChatMessage, ChatRequest, ChatRole};
pub use sse::{SseEvent, SseStreamParser};
pub use url::normalize_chat_url;
