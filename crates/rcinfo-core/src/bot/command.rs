//! Incoming text to bot command.

use crate::regno::{self, RegNo};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Admin: grant premium to the user id, if one was given.
    AddPremium(Option<String>),
    /// Admin: revoke premium from the user id, if one was given.
    RemovePremium(Option<String>),
    /// Show the sender's own counters.
    Quota,
    Lookup(RegNo),
    /// Slash command this bot does not know. Ignored.
    Unknown,
    /// Plain text that is not a registration number.
    Invalid,
}

/// Classify a message. Registration numbers must match exactly as typed.
pub fn parse(text: &str) -> Command {
    if let Some(rest) = text.strip_prefix('/') {
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((h, a)) => (h, a.trim()),
            None => (rest, ""),
        };
        // "/start@SomeBot" in group chats.
        let name = head.split('@').next().unwrap_or(head);
        let arg = args.split_whitespace().next().map(str::to_string);
        return match name {
            "start" => Command::Start,
            "addpremium" => Command::AddPremium(arg),
            "removepremium" => Command::RemovePremium(arg),
            "quota" => Command::Quota,
            _ => Command::Unknown,
        };
    }
    match regno::validate(text) {
        Ok(reg) => Command::Lookup(reg),
        Err(_) => Command::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse("/start"), Command::Start);
        assert_eq!(parse("/start@VehicleInfoBot"), Command::Start);
        assert_eq!(parse("/quota"), Command::Quota);
        assert_eq!(
            parse("/addpremium 12345"),
            Command::AddPremium(Some("12345".into()))
        );
        assert_eq!(
            parse("/removepremium   777  extra"),
            Command::RemovePremium(Some("777".into()))
        );
        assert_eq!(parse("/addpremium"), Command::AddPremium(None));
        assert_eq!(parse("/help"), Command::Unknown);
    }

    #[test]
    fn registration_numbers_match_as_typed() {
        assert!(matches!(parse("JK03N1234"), Command::Lookup(r) if r.as_str() == "JK03N1234"));
        assert_eq!(parse("jk03n1234"), Command::Invalid);
        assert_eq!(parse(" JK03N1234"), Command::Invalid);
        assert_eq!(parse("hello"), Command::Invalid);
    }
}
