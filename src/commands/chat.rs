//! Interactive chat handler
//!
//! Opens the store, builds the controller and runs a readline loop. Lines
//! starting with `/` are conversation commands; everything else is sent to
//! EmoBuddy in the active conversation.

use super::history::{print_active, print_message, print_summaries};
use super::special_commands::{parse_special_command, print_help, SpecialCommand};
use crate::chat::{ConversationController, TypingIndicator};
use crate::config::Config;
use crate::error::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::time::Duration;

/// Delay before the typing notice appears
const TYPING_NOTICE_DELAY: Duration = Duration::from_millis(400);

/// Start interactive chat mode
///
/// # Errors
///
/// Returns error if the store or provider cannot be set up, or the terminal
/// cannot be read
pub async fn run_chat(config: Config) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    let kv = super::open_store(&config)?;
    let mut controller = super::build_controller(&config, kv)?;
    controller.initialize();

    let mut rl = DefaultEditor::new()?;

    print_welcome_banner();
    print_active(&controller);

    loop {
        match rl.readline(&format!("{} ", "you>".green().bold())) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_special_command(trimmed) {
                    Ok(SpecialCommand::None) => {}
                    Ok(SpecialCommand::Exit) => break,
                    Ok(command) => {
                        handle_special_command(&mut controller, command);
                        continue;
                    }
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                }

                let notice = tokio::spawn(show_typing_notice(controller.typing_indicator()));
                let reply = controller.send_message(trimmed).await;
                notice.abort();

                if let Some(reply) = reply {
                    println!();
                    print_message(&reply);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Take care of yourself. Goodbye!");
    Ok(())
}

fn handle_special_command(controller: &mut ConversationController, command: SpecialCommand) {
    match command {
        SpecialCommand::NewConversation => {
            controller.start_new_conversation();
            println!();
            print_active(controller);
        }
        SpecialCommand::ListConversations => print_summaries(&controller.summaries()),
        SpecialCommand::SwitchConversation(id) => match controller.switch_conversation(&id) {
            Ok(()) => {
                println!();
                print_active(controller);
            }
            Err(e) => eprintln!("{}", e.to_string().red()),
        },
        SpecialCommand::DeleteConversation(id) => {
            let was_active = controller.active_id() == id;
            if controller.delete_conversation(&id) {
                println!("{}", format!("Deleted conversation {}", id).green());
                if was_active {
                    println!();
                    print_active(controller);
                }
            } else {
                println!("{}", format!("No conversation with id {}", id).yellow());
            }
        }
        SpecialCommand::ShowConversation => print_active(controller),
        SpecialCommand::Help => print_help(),
        SpecialCommand::Exit | SpecialCommand::None => {}
    }
}

async fn show_typing_notice(indicator: TypingIndicator) {
    tokio::time::sleep(TYPING_NOTICE_DELAY).await;
    if indicator.is_active() {
        println!("{}", "EmoBuddy is typing...".dimmed());
    }
}

fn print_welcome_banner() {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║              EmoBuddy - your supportive companion            ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Type '/help' for available commands, 'exit' to quit\n");
}
