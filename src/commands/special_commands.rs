//! Special commands parser for interactive chat mode
//!
//! This module parses the slash commands accepted by the chat loop. Special
//! commands allow users to:
//! - Start a new chat or open, list and delete stored conversations
//! - Send one of the starter questions
//! - View session status and the signed-in user
//! - Sign out or exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything else is
//! a message for the assistant.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Reference to a stored conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationRef {
    /// 1-based position in the last printed list
    Index(usize),
    /// Conversation id
    Id(String),
}

/// Special commands that can be executed during interactive chat
///
/// These commands act on the controller or the session, rather than being
/// sent to the assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new empty chat
    NewChat,

    /// Refresh and print the conversation list
    ListConversations,

    /// Load a stored conversation into the chat
    Open(ConversationRef),

    /// Delete a stored conversation
    Delete(ConversationRef),

    /// Show starter questions, or send the numbered one
    Suggest(Option<usize>),

    /// Display conversation state
    ShowStatus,

    /// Display the signed-in user
    WhoAmI,

    /// Clear the session and leave chat
    Logout,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent as a chat message.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns CommandError::UnknownCommand if input starts with "/" but is not a valid command.
/// Returns CommandError::UnsupportedArgument if a command receives an invalid argument.
/// Returns CommandError::MissingArgument if a command requires an argument but none was provided.
///
/// # Examples
///
/// ```
/// use pawfect::commands::special_commands::{
///     parse_special_command, ConversationRef, SpecialCommand,
/// };
///
/// let cmd = parse_special_command("/open 2").unwrap();
/// assert_eq!(cmd, SpecialCommand::Open(ConversationRef::Index(2)));
///
/// let cmd = parse_special_command("/NEW").unwrap();
/// assert_eq!(cmd, SpecialCommand::NewChat);
///
/// let cmd = parse_special_command("is chocolate bad for dogs?").unwrap();
/// assert_eq!(cmd, SpecialCommand::None);
///
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    let (command, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((c, a)) => (c.to_lowercase(), Some(a.trim())),
        None => (lower.clone(), None),
    };
    let arg = arg.filter(|a| !a.is_empty());

    match command.as_str() {
        "exit" | "quit" | "/exit" | "/quit" => no_argument(&command, arg, SpecialCommand::Exit),
        "/new" => no_argument(&command, arg, SpecialCommand::NewChat),
        "/list" | "/ls" => no_argument(&command, arg, SpecialCommand::ListConversations),
        "/status" => no_argument(&command, arg, SpecialCommand::ShowStatus),
        "/whoami" => no_argument(&command, arg, SpecialCommand::WhoAmI),
        "/logout" => no_argument(&command, arg, SpecialCommand::Logout),
        "/help" | "/?" => no_argument(&command, arg, SpecialCommand::Help),
        "/open" => required_ref(&command, arg, "/open <number|id>").map(SpecialCommand::Open),
        "/delete" | "/rm" => {
            required_ref(&command, arg, "/delete <number|id>").map(SpecialCommand::Delete)
        }
        "/suggest" => match arg {
            None => Ok(SpecialCommand::Suggest(None)),
            Some(a) => match a.parse::<usize>() {
                Ok(n) if n >= 1 => Ok(SpecialCommand::Suggest(Some(n))),
                _ => Err(CommandError::UnsupportedArgument {
                    command: command.clone(),
                    arg: a.to_string(),
                }),
            },
        },
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn no_argument(
    command: &str,
    arg: Option<&str>,
    parsed: SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    match arg {
        None => Ok(parsed),
        Some(a) => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: a.to_string(),
        }),
    }
}

fn required_ref(
    command: &str,
    arg: Option<&str>,
    usage: &str,
) -> Result<ConversationRef, CommandError> {
    let arg = arg.ok_or_else(|| CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    })?;
    match arg.parse::<usize>() {
        Ok(0) => Err(CommandError::UnsupportedArgument {
            command: command.to_string(),
            arg: arg.to_string(),
        }),
        Ok(n) => Ok(ConversationRef::Index(n)),
        Err(_) => Ok(ConversationRef::Id(arg.to_string())),
    }
}

/// Display help information for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat Mode
==========================================

CONVERSATIONS:
  /new              - Start a new chat
  /list             - Show your conversations (numbered)
  /ls               - Same as /list
  /open <n|id>      - Open conversation number n from the list, or by id
  /delete <n|id>    - Delete a conversation
  /rm <n|id>        - Same as /delete

STARTER QUESTIONS:
  /suggest          - Show starter questions
  /suggest <n>      - Ask starter question n

SESSION INFORMATION:
  /status           - Show the active conversation
  /whoami           - Show the signed-in user
  /help             - Show this help message
  /?                - Same as /help

SESSION CONTROL:
  /logout           - Sign out and leave chat
  exit              - Exit interactive mode
  quit              - Same as exit

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to Pawfect
  - For emergencies, always contact a licensed vet immediately
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regular_text() {
        assert_eq!(
            parse_special_command("My cat sneezes a lot").unwrap(),
            SpecialCommand::None
        );
        assert_eq!(
            parse_special_command("exit the vet's office?").unwrap(),
            SpecialCommand::None
        );
    }

    #[test]
    fn test_parse_exit_aliases() {
        assert_eq!(parse_special_command("exit").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_special_command("QUIT").unwrap(), SpecialCommand::Exit);
        assert_eq!(parse_special_command("/exit").unwrap(), SpecialCommand::Exit);
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewChat);
        assert_eq!(
            parse_special_command("/ls").unwrap(),
            SpecialCommand::ListConversations
        );
        assert_eq!(
            parse_special_command("  /Status ").unwrap(),
            SpecialCommand::ShowStatus
        );
        assert_eq!(parse_special_command("/?").unwrap(), SpecialCommand::Help);
        assert_eq!(parse_special_command("/logout").unwrap(), SpecialCommand::Logout);
    }

    #[test]
    fn test_parse_open_by_index_and_id() {
        assert_eq!(
            parse_special_command("/open 3").unwrap(),
            SpecialCommand::Open(ConversationRef::Index(3))
        );
        assert_eq!(
            parse_special_command("/open a1b2-C3").unwrap(),
            SpecialCommand::Open(ConversationRef::Id("a1b2-C3".to_string()))
        );
    }

    #[test]
    fn test_parse_open_missing_argument() {
        let err = parse_special_command("/open").unwrap_err();
        assert!(matches!(err, CommandError::MissingArgument { .. }));
        assert!(err.to_string().contains("/open <number|id>"));
    }

    #[test]
    fn test_parse_delete_zero_rejected() {
        assert!(matches!(
            parse_special_command("/delete 0"),
            Err(CommandError::UnsupportedArgument { .. })
        ));
    }

    #[test]
    fn test_parse_suggest() {
        assert_eq!(
            parse_special_command("/suggest").unwrap(),
            SpecialCommand::Suggest(None)
        );
        assert_eq!(
            parse_special_command("/suggest 2").unwrap(),
            SpecialCommand::Suggest(Some(2))
        );
        assert!(parse_special_command("/suggest two").is_err());
    }

    #[test]
    fn test_parse_argument_on_plain_command() {
        assert_eq!(
            parse_special_command("/new now"),
            Err(CommandError::UnsupportedArgument {
                command: "/new".to_string(),
                arg: "now".to_string()
            })
        );
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse_special_command("/yolo"),
            Err(CommandError::UnknownCommand("/yolo".to_string()))
        );
    }
}
