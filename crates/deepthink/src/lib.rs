//! Two-stage terminal chat client.
//!
//! Every question runs through an explicit analysis pass before the answer
//! is generated, and both passes render through the markdown pipeline.
//!
//! - [`config`] resolves the API key, endpoint, and model from a TOML file
//!   and environment overrides.
//! - [`pipeline`] builds the think and answer requests and drives them
//!   through the chat API.
//! - [`app`] tracks the multi-round conversation the pipeline replays.
//! - [`commands`] parses the `@new` and slash-command inputs.
//! - [`repl`] owns the prompt loop, cancellation, and turn rendering.
//! - [`logging`] is the opt-in file logger behind `DEEPTHINK_LOG`.

pub mod app;
pub mod commands;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod repl;
