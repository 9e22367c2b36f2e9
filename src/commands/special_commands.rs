//! Special commands parser for interactive chat
//!
//! Lines starting with `/` manage conversations instead of being sent to
//! EmoBuddy. Command names are case-insensitive; conversation ids are not.
//! `exit` and `quit` also work without the slash.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },

    /// Command takes no argument but one was given
    #[error("Command {command} takes no argument, got: {arg}")]
    UnexpectedArgument { command: String, arg: String },
}

/// Commands handled by the chat loop itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new conversation
    NewConversation,

    /// List all conversations
    ListConversations,

    /// Make another conversation active
    SwitchConversation(String),

    /// Delete a conversation
    DeleteConversation(String),

    /// Reprint the active conversation
    ShowConversation,

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; the input is a message for EmoBuddy
    None,
}

/// Parse a line of user input into a special command
///
/// # Errors
///
/// Returns [`CommandError`] when the input starts with `/` but is not a
/// known command or has the wrong arguments.
///
/// # Examples
///
/// ```
/// use emobuddy::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::NewConversation);
/// assert_eq!(
///     parse_special_command("/switch 01HZX").unwrap(),
///     SpecialCommand::SwitchConversation("01HZX".to_string())
/// );
/// assert_eq!(parse_special_command("I feel anxious").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (name, arg) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name.to_lowercase(), rest.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/new" => no_arg(&name, arg, SpecialCommand::NewConversation),
        "/list" | "/history" => no_arg(&name, arg, SpecialCommand::ListConversations),
        "/show" => no_arg(&name, arg, SpecialCommand::ShowConversation),
        "/help" | "/?" => no_arg(&name, arg, SpecialCommand::Help),
        "/exit" | "/quit" => no_arg(&name, arg, SpecialCommand::Exit),
        "/switch" => with_id(&name, arg, SpecialCommand::SwitchConversation),
        "/delete" => with_id(&name, arg, SpecialCommand::DeleteConversation),
        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

fn no_arg(name: &str, arg: &str, command: SpecialCommand) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnexpectedArgument {
            command: name.to_string(),
            arg: arg.to_string(),
        })
    }
}

fn with_id(
    name: &str,
    arg: &str,
    build: fn(String) -> SpecialCommand,
) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingArgument {
            command: name.to_string(),
            usage: format!("{} <conversation-id>", name),
        });
    }
    Ok(build(arg.to_string()))
}

/// Print the special command reference
pub fn print_help() {
    println!(
        r#"
Special Commands
================

CONVERSATIONS:
  /new            - Start a new conversation
  /list           - List all conversations (alias: /history)
  /switch <id>    - Continue another conversation
  /delete <id>    - Delete a conversation
  /show           - Reprint the current conversation

SESSION:
  /help           - Show this help
  /exit, /quit    - Leave the chat (also: exit, quit)

Anything else you type is sent to EmoBuddy.
"#
    );
}
