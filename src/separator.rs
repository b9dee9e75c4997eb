//! Width-aware section separators.

use crate::style::{bold, dim};
use crate::text::width::display_width;

/// Builds a `width`-column rule with `title` centered between `=` runs.
///
/// The title is padded with one space per side and measured in terminal
/// cells, so CJK and other wide characters center correctly. When fewer than
/// two columns remain for the rules, the title is dropped and a bare rule is
/// returned. Odd leftover columns go to the right run.
pub fn separator(title: &str, width: usize) -> String {
    let padded = format!(" {title} ");
    let title_width = display_width(&padded);

    if width < title_width + 2 {
        return "=".repeat(width);
    }

    let available = width - title_width;
    let left = available / 2;
    format!(
        "{}{}{}",
        dim(&"=".repeat(left)),
        bold(&padded),
        dim(&"=".repeat(available - left))
    )
}
