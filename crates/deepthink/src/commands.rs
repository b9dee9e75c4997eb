//! Control-command parsing for REPL input.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    NewConversation,
    Help,
    Quit,
    Unknown(String),
}

/// Parses REPL control input; plain questions return `None`.
///
/// `@new` is accepted alongside the slash spellings. Matching is
/// case-insensitive and anything after the command word is ignored.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("@new") {
        return Some(SlashCommand::NewConversation);
    }
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_ascii_lowercase();

    let parsed = match command.as_str() {
        "/new" | "/clear" | "/c" => SlashCommand::NewConversation,
        "/help" | "/?" => SlashCommand::Help,
        "/quit" | "/exit" | "/q" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
