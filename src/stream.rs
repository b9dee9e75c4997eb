//! Line lexer over streamed documents: prose goes out styled, fenced code
//! goes out as highlighted blocks.

use crate::latex::FormulaTranspiler;
use crate::markdown::MarkdownLine;
use crate::sink::RenderSink;

const FENCE: &str = "```";

/// Lexer state for one render pass. Rebuilt on every call, so a renderer can
/// be fed a complete document or successive growing prefixes of a stream; a
/// delimiter split across two network chunks is simply re-read whole on the
/// next call.
struct RenderState {
    in_code_block: bool,
    current_language: String,
    code_buffer: Vec<String>,
}

impl RenderState {
    fn new() -> Self {
        Self {
            in_code_block: false,
            current_language: String::from("text"),
            code_buffer: Vec::new(),
        }
    }
}

/// Renders interleaved Markdown, fenced code, and LaTeX to a [`RenderSink`].
pub struct StreamRenderer<S> {
    sink: S,
    transpiler: FormulaTranspiler,
    markdown: MarkdownLine,
}

impl<S: RenderSink> StreamRenderer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            transpiler: FormulaTranspiler::new(),
            markdown: MarkdownLine::new(),
        }
    }

    /// Renders `document`: formulas rewritten to plain text, fence interiors
    /// flushed as one highlighted block per fence pair, everything else
    /// styled as Markdown. Fence marker lines are never emitted. A fence
    /// still open at end of input flushes whatever it buffered.
    pub fn render(&mut self, document: &str) {
        let document = self.transpiler.process(document);
        let width = self.sink.width();
        let mut state = RenderState::new();

        for line in document.split('\n') {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix(FENCE) {
                if state.in_code_block {
                    self.flush_code(&mut state);
                } else {
                    let tag = rest.trim();
                    state.current_language = if tag.is_empty() {
                        String::from("text")
                    } else {
                        tag.to_string()
                    };
                    state.in_code_block = true;
                }
                continue;
            }

            if state.in_code_block {
                state.code_buffer.push(line.to_string());
            } else {
                self.sink.line(&self.markdown.render(line, width));
            }
        }

        if state.in_code_block && !state.code_buffer.is_empty() {
            self.flush_code(&mut state);
        }
    }

    fn flush_code(&mut self, state: &mut RenderState) {
        self.sink
            .code_block(&state.code_buffer.join("\n"), &state.current_language);
        state.code_buffer.clear();
        state.in_code_block = false;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
