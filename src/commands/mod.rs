//! Command handlers for the CLI
//!
//! - `chat`: interactive chat loop
//! - `history`: conversation listing and management
//! - `special_commands`: `/command` parsing for the chat loop

use crate::chat::{ConversationController, ConversationStore};
use crate::config::Config;
use crate::error::Result;
use crate::providers::create_provider;
use crate::storage::{KeyValueStore, SledStore};
use std::sync::Arc;

pub mod chat;
pub mod history;
pub mod special_commands;

/// Open the conversation store named by `config`, or the default one
///
/// # Errors
///
/// Returns error if the database cannot be opened
pub fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let store = match &config.storage.path {
        Some(path) => SledStore::open(path)?,
        None => SledStore::open_default()?,
    };
    tracing::info!("Using conversation store at {}", store.path().display());
    Ok(Arc::new(store))
}

/// Build a controller over `kv` with the configured provider
///
/// The controller is returned uninitialized; callers that send messages
/// must call [`ConversationController::initialize`].
///
/// # Errors
///
/// Returns error if the provider cannot be created
pub fn build_controller(
    config: &Config,
    kv: Arc<dyn KeyValueStore>,
) -> Result<ConversationController> {
    let provider = create_provider(&config.provider)?;
    let store = ConversationStore::load(kv);
    Ok(ConversationController::new(store, provider))
}
