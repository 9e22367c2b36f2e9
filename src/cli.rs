//! Command-line interface definition for EmoBuddy
//!
//! This module defines the CLI structure using clap's derive API,
//! providing the interactive chat command and history management.

use clap::{Parser, Subcommand};

/// EmoBuddy - supportive AI companion in your terminal
///
/// Chat with EmoBuddy and keep several conversations side by side.
#[derive(Parser, Debug, Clone)]
#[command(name = "emobuddy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Directory of the conversation store
    #[arg(long, env = "EMOBUDDY_STORE_PATH")]
    pub store_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for EmoBuddy
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat in the active conversation
    Chat,

    /// Inspect and manage stored conversations
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },
}

/// Conversation history subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HistoryCommand {
    /// List all conversations
    List,

    /// Print the messages of a conversation
    Show {
        /// Conversation id; the active conversation when omitted
        id: Option<String>,
    },

    /// Start a new conversation and make it active
    New,

    /// Make a conversation active
    Switch {
        /// Conversation id
        id: String,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            store_path: None,
            verbose: false,
            command: Commands::Chat,
        }
    }
}
