//! History command handler and conversation rendering

use crate::chat::{ConversationController, ConversationSummary, Message, Role};
use crate::cli::HistoryCommand;
use crate::config::Config;
use crate::dates::format_local;
use crate::error::{EmobuddyError, Result};
use crate::storage::KeyValueStore;
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

const TITLE_COLUMN_WIDTH: usize = 40;

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let kv = super::open_store(config)?;
    run_history(config, kv, command)
}

/// Run a history command against an already opened store
pub fn run_history(
    config: &Config,
    kv: Arc<dyn KeyValueStore>,
    command: HistoryCommand,
) -> Result<()> {
    let mut controller = super::build_controller(config, kv)?;

    match command {
        HistoryCommand::List => print_summaries(&controller.summaries()),
        HistoryCommand::Show { id } => {
            let id = id.unwrap_or_else(|| controller.active_id().to_string());
            let conversation = controller
                .conversation(&id)
                .ok_or_else(|| EmobuddyError::ConversationNotFound(id.clone()))?;
            println!("\n{}\n", conversation.display_title().bold());
            for message in conversation.messages() {
                print_message(message);
            }
        }
        HistoryCommand::New => {
            let id = controller.start_new_conversation();
            println!("{}", format!("Started conversation {}", id).green());
        }
        HistoryCommand::Switch { id } => {
            controller.switch_conversation(&id)?;
            println!("{}", format!("Switched to conversation {}", id).green());
        }
        HistoryCommand::Delete { id } => {
            if controller.delete_conversation(&id) {
                println!("{}", format!("Deleted conversation {}", id).green());
            } else {
                println!("{}", format!("No conversation with id {}", id).yellow());
            }
        }
    }

    Ok(())
}

/// Print a conversation overview table
pub fn print_summaries(summaries: &[ConversationSummary]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "".bold(),
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Message".bold()
    ]);

    for summary in summaries {
        let marker = if summary.is_active { "*" } else { "" };
        let last = summary
            .last_activity
            .map(|t| format_local(&t))
            .unwrap_or_else(|| "-".to_string());

        table.add_row(prettytable::row![
            marker.green(),
            summary.id.cyan(),
            clip(&summary.title, TITLE_COLUMN_WIDTH),
            summary.message_count,
            last
        ]);
    }

    println!("\nConversations:");
    table.printstd();
    println!();
    println!("Use {} to continue a conversation.", "/switch <ID>".cyan());
    println!();
}

/// Print one message with its author and time
pub fn print_message(message: &Message) {
    let when = format_local(&message.sent_at());
    match message.role {
        Role::User => println!("{} {}", "You".green().bold(), when.dimmed()),
        Role::Assistant => println!("{} {}", "EmoBuddy".cyan().bold(), when.dimmed()),
    }
    println!("{}\n", message.content);
}

/// Print the active conversation of `controller`
pub fn print_active(controller: &ConversationController) {
    if let Some(conversation) = controller.active_conversation() {
        println!(
            "{} {}\n",
            "Conversation:".bold(),
            conversation.display_title()
        );
        for message in conversation.messages() {
            print_message(message);
        }
    }
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let head: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
