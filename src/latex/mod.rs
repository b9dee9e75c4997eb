//! LaTeX formula transpilation for prose regions of a document.
//!
//! [`FormulaTranspiler::process`] rewrites `$...$` inline formulas and
//! `$$...$$` / `\[...\]` block formulas into terminal-displayable text while
//! leaving fenced code and escaped delimiters untouched. Matching is done
//! with an explicit scanner rather than regex splitting so behavior at
//! delimiter boundaries stays obvious: delimiters are non-greedy, may span
//! lines, and an unterminated delimiter is literal text.

pub mod plaintext;

pub use plaintext::latex_to_text;

use crate::style::dim;

const FENCE: &str = "```";
const BLOCK_LABEL: &str = " LaTeX ";
const BLOCK_RULE_WIDTH: usize = 8;

/// Rewrites LaTeX formulas in prose while passing fenced code through
/// verbatim.
#[derive(Debug, Default)]
pub struct FormulaTranspiler;

impl FormulaTranspiler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Converts every non-escaped formula outside fenced code. Code between
    /// a complete pair of fence markers is copied byte for byte; an
    /// unterminated fence leaves the remainder subject to prose processing,
    /// which a later call on the completed document will protect.
    pub fn process(&self, document: &str) -> String {
        let mut out = String::with_capacity(document.len());
        let mut idx = 0;

        while idx < document.len() {
            let Some(open) = find_from(document, idx, FENCE) else {
                out.push_str(&process_prose(&document[idx..]));
                break;
            };
            let Some(close) = find_from(document, open + FENCE.len(), FENCE) else {
                out.push_str(&process_prose(&document[idx..]));
                break;
            };

            let fence_end = close + FENCE.len();
            out.push_str(&process_prose(&document[idx..open]));
            out.push_str(&document[open..fence_end]);
            idx = fence_end;
        }

        out
    }
}

fn find_from(text: &str, from: usize, needle: &str) -> Option<usize> {
    text[from..].find(needle).map(|offset| from + offset)
}

fn process_prose(prose: &str) -> String {
    block_pass(&inline_pass(prose))
}

/// Replaces `$...$` spans. A `$$` pair is left for the block pass; a `$`
/// preceded by a backslash is literal.
fn inline_pass(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'$' && !escaped(bytes, idx) {
            if bytes.get(idx + 1) == Some(&b'$') {
                out.push_str("$$");
                idx += 2;
                continue;
            }
            if let Some(close) = find_dollar(bytes, idx + 1) {
                out.push_str(&inline_wrap(&text[idx + 1..close]));
                idx = close + 1;
                continue;
            }
        }
        idx = push_char(text, idx, &mut out);
    }

    out
}

/// Replaces `$$...$$` and `\[...\]` spans with bordered blocks.
fn block_pass(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut idx = 0;

    while idx < bytes.len() {
        if bytes[idx] == b'$' && bytes.get(idx + 1) == Some(&b'$') && !escaped(bytes, idx) {
            if let Some(close) = find_double_dollar(bytes, idx + 2) {
                out.push_str(&block_wrap(&text[idx + 2..close]));
                idx = close + 2;
                continue;
            }
            out.push_str("$$");
            idx += 2;
            continue;
        }
        if bytes[idx] == b'\\' && bytes.get(idx + 1) == Some(&b'[') && !escaped(bytes, idx) {
            if let Some(close) = find_close_bracket(bytes, idx + 2) {
                out.push_str(&block_wrap(&text[idx + 2..close]));
                idx = close + 2;
                continue;
            }
        }
        idx = push_char(text, idx, &mut out);
    }

    out
}

fn inline_wrap(formula: &str) -> String {
    format!(
        "{} {} {}",
        dim("┆"),
        latex_to_text(formula).trim(),
        dim("┆")
    )
}

fn block_wrap(formula: &str) -> String {
    let converted = latex_to_text(formula);
    format!(
        "\n┌ {:-^label_width$} ┐\n{}\n└ {} ┘\n",
        BLOCK_LABEL,
        converted.trim(),
        "-".repeat(BLOCK_RULE_WIDTH),
        label_width = BLOCK_RULE_WIDTH,
    )
}

fn escaped(bytes: &[u8], idx: usize) -> bool {
    idx > 0 && bytes[idx - 1] == b'\\'
}

fn find_dollar(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx < bytes.len() {
        if bytes[idx] == b'$' && !escaped(bytes, idx) {
            return Some(idx);
        }
        idx += 1;
    }
    None
}

fn find_double_dollar(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx + 1 < bytes.len() {
        if bytes[idx] == b'$' && bytes[idx + 1] == b'$' && !escaped(bytes, idx) {
            return Some(idx);
        }
        idx += 1;
    }
    None
}

fn find_close_bracket(bytes: &[u8], from: usize) -> Option<usize> {
    let mut idx = from;
    while idx + 1 < bytes.len() {
        if bytes[idx] == b'\\' && bytes[idx + 1] == b']' && !escaped(bytes, idx) {
            return Some(idx);
        }
        idx += 1;
    }
    None
}

/// Copies the char starting at `idx` and returns the next index. Delimiter
/// bytes are ASCII, so `idx` always sits on a char boundary here.
fn push_char(text: &str, idx: usize, out: &mut String) -> usize {
    let Some(ch) = text[idx..].chars().next() else {
        return text.len();
    };
    out.push(ch);
    idx + ch.len_utf8()
}

#[cfg(test)]
mod tests {
    use super::FormulaTranspiler;
    use crate::text::ansi::strip_ansi;

    fn process(document: &str) -> String {
        FormulaTranspiler::new().process(document)
    }

    #[test]
    fn inline_dollar_becomes_dim_bracketed_text() {
        let output = process("Before $x^2$ after");
        assert_eq!(strip_ansi(&output), "Before ┆ x² ┆ after");
        assert!(output.contains("\x1b[2m┆\x1b[22m"));
        assert!(!output.contains('$'));
    }

    #[test]
    fn escaped_dollar_never_converts() {
        let input = r"price \$50 and \$x\$ stay";
        assert_eq!(process(input), input);
    }

    #[test]
    fn unescaped_pairs_convert_while_escaped_stay() {
        let output = strip_ansi(&process(r"keep \$lit\$ but $x$ converts"));
        assert_eq!(output, r"keep \$lit\$ but ┆ x ┆ converts");
    }

    #[test]
    fn double_dollar_renders_bordered_block() {
        let output = process("$$E=mc^2$$");
        assert_eq!(output, "\n┌  LaTeX - ┐\nE=mc²\n└ -------- ┘\n");
    }

    #[test]
    fn bracket_delimiters_render_bordered_block() {
        let output = process(r"\[\frac{1}{2}\]");
        assert_eq!(output, "\n┌  LaTeX - ┐\n1/2\n└ -------- ┘\n");
    }

    #[test]
    fn block_formulas_span_lines() {
        let output = process("$$\n\\alpha\n+ 1\n$$");
        assert!(output.contains("α\n+ 1"));
        assert!(!output.contains('$'));
    }

    #[test]
    fn fenced_code_passes_through_verbatim() {
        let input = "```python\ntotal = \"$5\" + \"$6\"\n```";
        assert_eq!(process(input), input);
    }

    #[test]
    fn prose_around_fences_still_converts() {
        let output = process("Has $x$\n```\nkeep $y$\n```\nand $z$");
        let visible = strip_ansi(&output);
        assert!(visible.contains("┆ x ┆"));
        assert!(visible.contains("keep $y$"));
        assert!(visible.contains("┆ z ┆"));
    }

    #[test]
    fn unterminated_dollar_stays_literal() {
        let input = "cost is $5 and rising";
        assert_eq!(process(input), input);
    }

    #[test]
    fn unterminated_block_delimiters_stay_literal() {
        assert_eq!(process("open $$x only"), "open $$x only");
        assert_eq!(process(r"open \[x only"), r"open \[x only");
    }

    #[test]
    fn processing_is_idempotent_once_markers_are_gone() {
        let first = process("mix $a$ then $$b$$ and\n```\n$c$\n```\ntail");
        let second = process(&first);
        assert_eq!(first, second);
    }

    #[test]
    fn inline_pass_does_not_split_block_delimiters() {
        // A lone $$ pair must not be read as two empty inline formulas.
        let output = strip_ansi(&process("$$x$$"));
        assert!(output.contains("┌"));
        assert!(!output.contains("┆"));
    }

    #[test]
    fn inline_and_block_can_coexist() {
        let output = strip_ansi(&process("inline $a$ and block $$b$$."));
        assert!(output.contains("┆ a ┆"));
        assert!(output.contains("┌  LaTeX - ┐\nb\n└"));
    }
}
