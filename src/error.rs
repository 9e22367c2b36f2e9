//! Error types for EmoBuddy
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for EmoBuddy operations
///
/// Covers configuration loading, provider interactions, persistence and
/// conversation lookups. Remote-call failures are normally absorbed by the
/// controller and never reach the caller.
#[derive(Error, Debug)]
pub enum EmobuddyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, response decoding, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// A conversation id that is not in the conversation list
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for EmoBuddy operations
///
/// Uses `anyhow::Error` as the error type so callers can attach context
/// while still downcasting to [`EmobuddyError`] where it matters.
pub type Result<T> = anyhow::Result<T>;
