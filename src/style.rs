//! ANSI styling helpers.
//!
//! Every helper wraps its text in a set/reset pair so styles never leak into
//! adjacent output. Nesting works as long as inner and outer styles use
//! different reset codes (e.g. `bold(&cyan("x"))`).

pub fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

pub fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

pub fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

pub fn blue(text: &str) -> String {
    ansi_wrap(text, "\x1b[34m", "\x1b[39m")
}

pub fn cyan(text: &str) -> String {
    ansi_wrap(text, "\x1b[36m", "\x1b[39m")
}

pub fn yellow(text: &str) -> String {
    ansi_wrap(text, "\x1b[33m", "\x1b[39m")
}

pub fn red(text: &str) -> String {
    ansi_wrap(text, "\x1b[31m", "\x1b[39m")
}

pub fn green(text: &str) -> String {
    ansi_wrap(text, "\x1b[32m", "\x1b[39m")
}

pub fn magenta(text: &str) -> String {
    ansi_wrap(text, "\x1b[35m", "\x1b[39m")
}

pub fn italic(text: &str) -> String {
    ansi_wrap(text, "\x1b[3m", "\x1b[23m")
}

pub fn underline(text: &str) -> String {
    ansi_wrap(text, "\x1b[4m", "\x1b[24m")
}

pub fn strikethrough(text: &str) -> String {
    ansi_wrap(text, "\x1b[9m", "\x1b[29m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_wraps_with_faint_and_normal_intensity() {
        assert_eq!(dim("x"), "\x1b[2mx\x1b[22m");
    }

    #[test]
    fn color_helpers_reset_foreground_only() {
        assert_eq!(cyan("t"), "\x1b[36mt\x1b[39m");
        assert!(green("t").ends_with("\x1b[39m"));
    }

    #[test]
    fn nested_styles_preserve_inner_text() {
        let styled = bold(&cyan("hi"));
        assert!(styled.contains("hi"));
        assert!(styled.starts_with("\x1b[1m"));
        assert!(styled.ends_with("\x1b[22m"));
    }
}
