// Chat command parsing

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Price,
    Help,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::Start, Command::Stop, Command::Price, Command::Help];

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Price => "price",
            Command::Help => "help",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Command::Start => "Start receiving price updates",
            Command::Stop => "Stop receiving updates",
            Command::Price => "Get current price and market data",
            Command::Help => "Show available commands",
        }
    }

    /// Accepts "/price", "/Price@SomeBot" and trailing arguments.
    /// Anything else (plain text, unknown commands) is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let head = text.trim_start().split_whitespace().next()?;
        let name = head.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        Command::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/stop"), Some(Command::Stop));
        assert_eq!(Command::parse("/price"), Some(Command::Price));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(Command::parse("/start@SolPriceBot"), Some(Command::Start));
        assert_eq!(Command::parse("  /PRICE now please"), Some(Command::Price));
    }

    #[test]
    fn test_parse_rejects_non_commands() {
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse("/unknown"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/"), None);
        assert_eq!(Command::parse("hello /start"), None);
    }
}
