//! Streaming rich-text renderer for terminal chat output.
//!
//! Takes raw, possibly incomplete, incrementally-arriving model text with
//! interleaved Markdown, fenced code blocks, and inline/block LaTeX, and
//! renders it to a terminal.
//!
//! # Public API Overview
//! - [`FormulaTranspiler`] rewrites LaTeX spans in prose to readable plain
//!   text, leaving fenced code and escaped delimiters alone.
//! - [`StreamRenderer`] lexes a document line by line and emits styled
//!   Markdown lines and syntax-highlighted code blocks to a [`RenderSink`].
//! - [`separator`] centers a section title inside an `=` rule, correct for
//!   wide (CJK) characters.
//! - Text and width helpers for ANSI-safe formatting.
//!
//! The renderer may be called once on a buffered document or repeatedly on
//! growing prefixes of a stream; both yield the same final visible output.

pub mod highlight;
pub mod latex;
pub mod markdown;
pub mod separator;
pub mod sink;
pub mod stream;
pub mod style;
pub mod text;

/// LaTeX-in-prose rewriting.
pub use crate::latex::{latex_to_text, FormulaTranspiler};

/// Styled Markdown for single prose lines.
pub use crate::markdown::{MarkdownLine, MarkdownStyleFn, MarkdownTheme};

/// Width-aware section separators.
pub use crate::separator::separator;

/// The injected output capability and its implementations.
pub use crate::sink::{CaptureSink, RenderSink, SinkEvent, TerminalSink};

/// The line-lexing stream renderer.
pub use crate::stream::StreamRenderer;

/// ANSI stripping helper.
pub use crate::text::ansi::strip_ansi;
/// Visible width helper that ignores ANSI control sequences.
pub use crate::text::width::display_width;
