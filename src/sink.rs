//! Output sink capability.
//!
//! The renderer never talks to the terminal directly; it is handed a
//! [`RenderSink`] and emits through it. [`TerminalSink`] is the production
//! implementation. [`CaptureSink`] records emitted events in memory so tests
//! and embedders can assert on rendered output.

use std::io::{self, Write};

use crate::highlight;

/// Default column count when the output is not a terminal (pipes, CI).
pub const DEFAULT_COLUMNS: usize = 80;

/// Line-aware output destination for rendered text.
pub trait RenderSink {
    /// Emit one already-styled text line.
    fn line(&mut self, text: &str);

    /// Emit one syntax-highlighted code block.
    fn code_block(&mut self, code: &str, language: &str);

    /// Current display width in columns.
    fn width(&self) -> usize;
}

/// Sink that writes to the process stdout.
///
/// Width is measured per call so separators stay correct after a resize.
/// Writes are best-effort: a closed pipe must not bring down the caller
/// mid-render.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl TerminalSink {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RenderSink for TerminalSink {
    fn line(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
    }

    fn code_block(&mut self, code: &str, language: &str) {
        let highlighted = highlight::highlight_block(code, language);
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{highlighted}");
        let _ = stdout.flush();
    }

    fn width(&self) -> usize {
        stdout_columns().unwrap_or(DEFAULT_COLUMNS)
    }
}

#[cfg(unix)]
fn stdout_columns() -> Option<usize> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 {
        Some(size.ws_col as usize)
    } else {
        None
    }
}

#[cfg(not(unix))]
fn stdout_columns() -> Option<usize> {
    None
}

/// One recorded emit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Line(String),
    CodeBlock { code: String, language: String },
}

/// In-memory sink with a fixed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSink {
    pub events: Vec<SinkEvent>,
    columns: usize,
}

impl CaptureSink {
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self {
            events: Vec::new(),
            columns,
        }
    }

    /// Texts of all emitted lines, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Line(text) => Some(text.as_str()),
                SinkEvent::CodeBlock { .. } => None,
            })
            .collect()
    }

    /// `(code, language)` of all emitted code blocks, in order.
    pub fn code_blocks(&self) -> Vec<(&str, &str)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::CodeBlock { code, language } => {
                    Some((code.as_str(), language.as_str()))
                }
                SinkEvent::Line(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl RenderSink for CaptureSink {
    fn line(&mut self, text: &str) {
        self.events.push(SinkEvent::Line(text.to_string()));
    }

    fn code_block(&mut self, code: &str, language: &str) {
        self.events.push(SinkEvent::CodeBlock {
            code: code.to_string(),
            language: language.to_string(),
        });
    }

    fn width(&self) -> usize {
        self.columns
    }
}
