//! Provider module for EmoBuddy
//!
//! This module contains the remote chat abstraction and the Gemini
//! implementation.

pub mod base;
pub mod gemini;

pub use base::{ChatProvider, ChatRole, ChatSession, ChatTurn};
pub use gemini::{GeminiChatSession, GeminiProvider};

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
///
/// # Examples
///
/// ```
/// use emobuddy::config::Config;
/// use emobuddy::providers::create_provider;
///
/// let config = Config::default();
/// let provider = create_provider(&config.provider).unwrap();
/// assert_eq!(provider.name(), "gemini");
/// ```
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn ChatProvider>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.gemini.clone())?)),
        other => Err(crate::error::EmobuddyError::Provider(format!(
            "Unknown provider type: {}",
            other
        ))
        .into()),
    }
}
