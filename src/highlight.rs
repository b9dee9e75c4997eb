//! Fenced-code syntax highlighting.
//!
//! Sublime-syntax highlighting over the bundled defaults, emitted as 24-bit
//! ANSI. Syntax and theme sets are expensive to load, so they live in lazy
//! globals shared by every block.

use once_cell::sync::Lazy;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

static SYNTAX_SET: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: Lazy<ThemeSet> = Lazy::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

/// Highlights `code` for terminal output, one styled line per input line,
/// ending with a full reset so block styling never bleeds into what follows.
pub fn highlight_block(code: &str, language: &str) -> String {
    let syntax = syntax_for(language);
    let theme = &THEME_SET.themes[THEME];
    let mut highlighter = HighlightLines::new(syntax, theme);

    let needs_newline = !code.ends_with('\n');
    let mut output = String::with_capacity(code.len() * 2);
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false)),
            Err(_) => output.push_str(line),
        }
    }

    output.push_str("\x1b[0m");
    if needs_newline {
        output.push('\n');
    }
    output
}

/// Resolves a fence language tag to a syntax definition: common aliases
/// first, then token lookup, then extension lookup, then plain text.
fn syntax_for(language: &str) -> &'static SyntaxReference {
    let lowered = language.trim().to_lowercase();
    let token = match lowered.as_str() {
        "shell" | "sh" | "zsh" | "dockerfile" => "bash",
        "" | "text" | "plain" | "plaintext" => return SYNTAX_SET.find_syntax_plain_text(),
        other => other,
    };

    SYNTAX_SET
        .find_syntax_by_token(token)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(token))
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

#[cfg(test)]
mod tests {
    use super::{highlight_block, syntax_for};

    #[test]
    fn known_language_gets_colored_output() {
        let output = highlight_block("print(1)", "python");
        assert!(output.contains("print"));
        assert!(output.contains("\x1b[38;2;"));
        assert!(output.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn unknown_language_falls_back_to_plain_text() {
        assert_eq!(syntax_for("no-such-language").name, "Plain Text");
        let output = highlight_block("some words", "no-such-language");
        assert!(output.contains("some words"));
    }

    #[test]
    fn text_tag_is_plain() {
        assert_eq!(syntax_for("text").name, "Plain Text");
        assert_eq!(syntax_for("").name, "Plain Text");
    }

    #[test]
    fn shell_aliases_resolve_to_bash() {
        assert_eq!(syntax_for("sh").name, syntax_for("bash").name);
        assert_eq!(syntax_for("zsh").name, syntax_for("bash").name);
    }

    #[test]
    fn multi_line_code_keeps_line_structure() {
        let output = highlight_block("fn main() {\n    let x = 1;\n}", "rust");
        assert_eq!(output.matches('\n').count(), 3);
    }
}
