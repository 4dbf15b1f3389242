//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to pick an age group, stage images, and inspect the session
//! without sending anything to the API.

use crate::chat::prompt::AgeGroup;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Select an age group, or show the selector when `None`.
    Age(Option<AgeGroup>),

    /// Stage the image at the given path for the next send.
    Image(String),

    /// Drop the staged image.
    Unstage,

    /// List the suggestions for the current age group.
    Suggestions,

    /// Pre-fill the draft with the suggestion at this 1-based index.
    UseSuggestion(usize),

    /// Print the whole conversation.
    History,

    /// Print the full screen: header, age tabs, messages, suggestions.
    View,

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use compass::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/age infant").is_some());
/// assert!(parse_command("How do I handle tantrums?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "age" => match argument {
            Some(arg) => match arg.parse() {
                Ok(age) => ChatCommand::Age(Some(age)),
                Err(err) => ChatCommand::Invalid(format!("/age: {err}")),
            },
            None => ChatCommand::Age(None),
        },
        "image" | "img" => match argument {
            Some(path) => ChatCommand::Image(path.to_string()),
            None => ChatCommand::Invalid("/image requires a file path".to_string()),
        },
        "unstage" => ChatCommand::Unstage,
        "suggest" | "suggestions" => match argument {
            Some(arg) => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => ChatCommand::UseSuggestion(n),
                _ => ChatCommand::Invalid(format!(
                    "/suggest expects a suggestion number, got {arg:?}"
                )),
            },
            None => ChatCommand::Suggestions,
        },
        "history" => ChatCommand::History,
        "view" => ChatCommand::View,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("unknown command: /{command}")),
    };
    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /age [group]           Select infant, toddler, school-age, or adolescent
  /image <path>          Attach an image to the next message
  /unstage               Remove the attached image
  /suggest               List suggestions for the current age group
  /suggest <n>           Start a message from suggestion n
  /history               Show the conversation so far
  /view                  Show the full screen
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quit_commands() {
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/exit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("  /quit  "), Some(ChatCommand::Quit));
    }

    #[test]
    fn parse_age() {
        assert_eq!(
            parse_command("/age infant"),
            Some(ChatCommand::Age(Some(AgeGroup::Infant)))
        );
        assert_eq!(
            parse_command("/AGE 6-12"),
            Some(ChatCommand::Age(Some(AgeGroup::SchoolAge)))
        );
        assert_eq!(
            parse_command("/age 13-18 years"),
            Some(ChatCommand::Age(Some(AgeGroup::Adolescent)))
        );
        assert_eq!(parse_command("/age"), Some(ChatCommand::Age(None)));
        assert!(matches!(
            parse_command("/age grown-up"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_image() {
        assert_eq!(
            parse_command("/image drawings/house.png"),
            Some(ChatCommand::Image("drawings/house.png".to_string()))
        );
        assert_eq!(
            parse_command("/image  my photos/rash.jpg "),
            Some(ChatCommand::Image("my photos/rash.jpg".to_string()))
        );
        assert!(matches!(
            parse_command("/image"),
            Some(ChatCommand::Invalid(_))
        ));
        assert_eq!(parse_command("/unstage"), Some(ChatCommand::Unstage));
    }

    #[test]
    fn parse_suggest() {
        assert_eq!(parse_command("/suggest"), Some(ChatCommand::Suggestions));
        assert_eq!(
            parse_command("/suggest 3"),
            Some(ChatCommand::UseSuggestion(3))
        );
        assert!(matches!(
            parse_command("/suggest 0"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/suggest two"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_misc() {
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/view"), Some(ChatCommand::View));
        assert_eq!(parse_command("/stats"), Some(ChatCommand::Stats));
        assert_eq!(parse_command("/help"), Some(ChatCommand::Help));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn unknown_and_plain_text() {
        assert_eq!(
            parse_command("/clear"),
            Some(ChatCommand::Invalid("unknown command: /clear".to_string()))
        );
        assert_eq!(parse_command("Hello!"), None);
        assert_eq!(parse_command("Is 1/2 cup of juice too much?"), None);
    }

    #[test]
    fn help_text_not_empty() {
        let help = help_text();
        assert!(help.contains("/age"));
        assert!(help.contains("/image"));
        assert!(help.contains("/suggest"));
        assert!(help.contains("/quit"));
    }
}
