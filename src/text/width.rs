//! Terminal-cell display width.
//!
//! Widths follow east-asian-width conventions: wide and fullwidth characters
//! take two columns, combining marks take zero, everything else takes one.
//! Emoji graphemes are forced to two columns because several presentation
//! sequences measure narrower than terminals draw them. ANSI escape
//! sequences contribute nothing.

use emojis::get as emoji_get;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::ansi_sequence_at;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme.is_empty() {
        return 0;
    }
    if grapheme == "\t" {
        return TAB_WIDTH;
    }

    if emoji_get(grapheme).is_some() {
        return 2;
    }

    grapheme.chars().map(char_width).sum()
}

fn char_width(ch: char) -> usize {
    if ch == '\t' {
        return TAB_WIDTH;
    }
    // Control characters are zero-width; anything the classifier has no
    // answer for counts as one column so layouts never come up short.
    match UnicodeWidthChar::width(ch) {
        Some(width) => width,
        None if ch.is_control() => 0,
        None => 1,
    }
}

/// Display width of `input` in terminal cells, with ANSI escapes skipped.
pub fn display_width(input: &str) -> usize {
    if input.is_empty() {
        return 0;
    }

    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(sequence) = ansi_sequence_at(input, idx) {
            idx += sequence.length;
            continue;
        }

        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }

    clean.graphemes(true).map(grapheme_width).sum()
}

#[cfg(test)]
mod tests {
    use super::{display_width, grapheme_width};

    #[test]
    fn ascii_is_one_column_per_char() {
        assert_eq!(display_width("Title"), 5);
    }

    #[test]
    fn cjk_is_two_columns_per_char() {
        assert_eq!(display_width("思考"), 4);
        assert_eq!(display_width(" 思考过程 "), 10);
    }

    #[test]
    fn ansi_ignored_in_width() {
        assert_eq!(display_width("hi\x1b[31m!!\x1b[0m"), 4);
    }

    #[test]
    fn osc8_link_ignored_in_width() {
        assert_eq!(
            display_width("\x1b]8;;https://example.com\x07link\x1b]8;;\x07"),
            4
        );
    }

    #[test]
    fn rgi_emoji_width_is_two() {
        assert_eq!(display_width("😀"), 2);
        assert_eq!(grapheme_width("👍🏽"), 2);
    }

    #[test]
    fn combining_marks_are_zero_width() {
        // "e" followed by U+0301 combining acute forms one two-char grapheme.
        assert_eq!(display_width("e\u{301}"), 1);
    }

    #[test]
    fn control_chars_are_zero_width() {
        assert_eq!(display_width("a\u{0}b"), 2);
    }
}
