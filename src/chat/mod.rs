//! Conversations and the controller that drives them
//!
//! - [`conversation`]: message and conversation data model
//! - [`store`]: persisted conversation list and active pointer
//! - [`controller`]: user-facing operations over the store and a remote session

pub mod controller;
pub mod conversation;
pub mod store;

pub use controller::{ConversationController, TypingIndicator};
pub use conversation::{
    derive_title, Conversation, Message, Role, APOLOGY_MESSAGE, FIRST_CONVERSATION_GREETING,
    FIRST_CONVERSATION_TITLE, NEW_CONVERSATION_GREETING, NEW_CONVERSATION_TITLE,
};
pub use store::{ConversationStore, ConversationSummary};
