/// Slash commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Save,
    DeleteLast,
    Cleanup,
    Unknown(String),
}

impl Command {
    /// Parses `/name[@bot] [args]`. Returns `None` for text that is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name).to_lowercase();

        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "save" => Command::Save,
            "del" => Command::DeleteLast,
            "cleanup" => Command::Cleanup,
            _ => Command::Unknown(name),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Command::Start => "/start",
            Command::Help => "/help",
            Command::Save => "/save",
            Command::DeleteLast => "/del",
            Command::Cleanup => "/cleanup",
            Command::Unknown(_) => "/unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("  /del  "), Some(Command::DeleteLast));
        assert_eq!(Command::parse("/SAVE"), Some(Command::Save));
        assert_eq!(Command::parse("/cleanup now"), Some(Command::Cleanup));
    }

    #[test]
    fn strips_bot_mention() {
        assert_eq!(Command::parse("/help@MetrixBot"), Some(Command::Help));
    }

    #[test]
    fn plain_text_is_not_a_command() {
        assert_eq!(Command::parse("120 80 /save"), None);
        assert_eq!(Command::parse(""), None);
    }

    #[test]
    fn unknown_commands_keep_their_name() {
        assert_eq!(
            Command::parse("/stats"),
            Some(Command::Unknown("stats".into()))
        );
    }
}
