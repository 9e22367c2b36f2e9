//! EmoBuddy - supportive AI companion library
//!
//! This library provides the conversation model, its persistence, and the
//! controller that relays messages to a remote chat model.
//!
//! # Architecture
//!
//! - `chat`: conversations, the persisted store and the controller
//! - `providers`: remote chat abstraction and the Gemini implementation
//! - `storage`: key-value backends (sled on disk, in-memory for tests)
//! - `config`: configuration loading and validation
//! - `dates`: timestamp creation, parsing and display
//! - `error`: error types and result aliases
//! - `cli` and `commands`: the command-line front end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use emobuddy::chat::{ConversationController, ConversationStore};
//! use emobuddy::providers::create_provider;
//! use emobuddy::storage::SledStore;
//! use emobuddy::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = ConversationStore::load(Arc::new(SledStore::open_default()?));
//!     let mut controller = ConversationController::new(store, create_provider(&config.provider)?);
//!     controller.initialize();
//!     if let Some(reply) = controller.send_message("I feel anxious today").await {
//!         println!("{}", reply.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dates;
pub mod error;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use chat::{Conversation, ConversationController, ConversationStore, Message, Role};
pub use config::Config;
pub use error::{EmobuddyError, Result};
