//! Conversation data model
//!
//! A [`Conversation`] is an append-only list of [`Message`]s plus a title and
//! the flag that marks its first assistant message as a seeded greeting. The
//! serialized form keeps the field names of the stored blob
//! (`welcomeMessageSent`), so existing state loads unchanged.

use crate::dates::{now_timestamp, parse_timestamp};
use crate::providers::ChatTurn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Title given to freshly started conversations until the first user message
pub const NEW_CONVERSATION_TITLE: &str = "New Conversation";

/// Title of the conversation created on first run
pub const FIRST_CONVERSATION_TITLE: &str = "First Conversation";

/// Greeting seeded into the conversation created on first run
pub const FIRST_CONVERSATION_GREETING: &str =
    "Hello, I'm EmoBuddy, your supportive AI companion. How are you feeling today?";

/// Greeting seeded into every conversation started afterwards
pub const NEW_CONVERSATION_GREETING: &str = "Hello, I'm EmoBuddy. How can I support you today?";

/// Assistant message recorded when the remote model cannot be reached
pub const APOLOGY_MESSAGE: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again later.";

/// Number of characters of the first user message kept in a derived title
pub const TITLE_MAX_CHARS: usize = 30;

/// Generate a fresh identifier for a conversation or message
pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Derive a conversation title from the first user message
///
/// Keeps the first [`TITLE_MAX_CHARS`] characters and appends `...` when
/// anything was cut.
///
/// # Examples
///
/// ```
/// use emobuddy::chat::derive_title;
///
/// assert_eq!(derive_title("Feeling better"), "Feeling better");
/// assert_eq!(
///     derive_title("I could not sleep at all last night and I am tired"),
///     "I could not sleep at all last ..."
/// );
/// ```
pub fn derive_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the app
    User,
    /// EmoBuddy, either a model reply or a synthetic message
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier
    pub id: String,
    /// Author of the message
    pub role: Role,
    /// Message text
    pub content: String,
    /// Creation time as an ISO-8601 string
    pub timestamp: String,
}

impl Message {
    /// Creates a message stamped with a fresh id and the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: now_timestamp(),
        }
    }

    /// Creates a new user message
    ///
    /// # Examples
    ///
    /// ```
    /// use emobuddy::chat::{Message, Role};
    ///
    /// let msg = Message::user("I feel anxious today");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Timestamp as an instant; unreadable values become the current time
    pub fn sent_at(&self) -> DateTime<Utc> {
        parse_timestamp(&self.timestamp)
    }
}

/// A conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    welcome_message_sent: bool,
}

impl Conversation {
    /// Builds a conversation from its stored parts
    pub fn from_parts(
        id: impl Into<String>,
        title: impl Into<String>,
        messages: Vec<Message>,
        welcome_message_sent: bool,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages,
            welcome_message_sent,
        }
    }

    /// Starts a new conversation with a seeded greeting
    ///
    /// # Examples
    ///
    /// ```
    /// use emobuddy::chat::{Conversation, NEW_CONVERSATION_TITLE};
    ///
    /// let conversation = Conversation::started();
    /// assert_eq!(conversation.title(), NEW_CONVERSATION_TITLE);
    /// assert_eq!(conversation.messages().len(), 1);
    /// assert!(conversation.welcome_message_sent());
    /// assert!(conversation.history().is_empty());
    /// ```
    pub fn started() -> Self {
        Self::from_parts(
            new_id(),
            NEW_CONVERSATION_TITLE,
            vec![Message::assistant(NEW_CONVERSATION_GREETING)],
            true,
        )
    }

    /// The conversation present before anything has been stored
    pub fn first_run() -> Self {
        let greeting = Message {
            id: "1".to_string(),
            role: Role::Assistant,
            content: FIRST_CONVERSATION_GREETING.to_string(),
            timestamp: now_timestamp(),
        };
        Self::from_parts("1", FIRST_CONVERSATION_TITLE, vec![greeting], true)
    }

    /// Unique identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Stored title, possibly blank
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title for display; blank titles read as [`NEW_CONVERSATION_TITLE`]
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            NEW_CONVERSATION_TITLE
        } else {
            &self.title
        }
    }

    /// Messages in chronological order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether the first assistant message is a seeded greeting
    pub fn welcome_message_sent(&self) -> bool {
        self.welcome_message_sent
    }

    /// Whether the title is still the placeholder of a new conversation
    pub fn has_placeholder_title(&self) -> bool {
        self.title == NEW_CONVERSATION_TITLE
    }

    /// Time of the most recent message
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.messages.last().map(Message::sent_at)
    }

    pub(crate) fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    fn is_seeded_greeting(&self, index: usize, message: &Message) -> bool {
        self.welcome_message_sent && index == 0 && message.role == Role::Assistant
    }

    /// Context window handed to a remote session for this conversation
    ///
    /// Every user message is kept. Assistant messages become model turns,
    /// except the seeded greeting when `welcome_message_sent` is set: that
    /// greeting was never part of a model exchange.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(index, message)| !self.is_seeded_greeting(*index, message))
            .map(|(_, message)| match message.role {
                Role::User => ChatTurn::user(message.content.as_str()),
                Role::Assistant => ChatTurn::model(message.content.as_str()),
            })
            .collect()
    }
}
