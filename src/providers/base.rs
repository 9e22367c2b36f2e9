//! Base provider traits and common types for EmoBuddy
//!
//! A [`ChatProvider`] turns a role-tagged history into a [`ChatSession`]. The
//! session is the stateful handle the controller talks to: it accepts one
//! user message at a time and returns the model's reply text.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Speaker of a turn in a remote chat history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person using the app
    User,
    /// The remote model
    Model,
}

impl ChatRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of context handed to the remote model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who produced the turn
    pub role: ChatRole,
    /// Turn text
    pub text: String,
}

impl ChatTurn {
    /// Creates a user turn
    ///
    /// # Examples
    ///
    /// ```
    /// use emobuddy::providers::{ChatRole, ChatTurn};
    ///
    /// let turn = ChatTurn::user("Hello");
    /// assert_eq!(turn.role, ChatRole::User);
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Creates a model turn
    ///
    /// # Examples
    ///
    /// ```
    /// use emobuddy::providers::{ChatRole, ChatTurn};
    ///
    /// let turn = ChatTurn::model("Hi, how are you feeling?");
    /// assert_eq!(turn.role, ChatRole::Model);
    /// ```
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A live chat with the remote model
///
/// Implementations keep their own copy of the history. A successful
/// [`send_message`](ChatSession::send_message) appends both the user turn and
/// the reply; a failed one leaves the history untouched.
#[async_trait]
pub trait ChatSession: Send {
    /// Send a user message and wait for the reply text
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the service rejects it, or the
    /// response carries no text
    async fn send_message(&mut self, text: &str) -> Result<String>;

    /// Turns currently held as context
    fn history(&self) -> &[ChatTurn];
}

/// Factory for chat sessions against one configured model
pub trait ChatProvider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Start a session seeded with `history`
    fn start_chat(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession>;
}
