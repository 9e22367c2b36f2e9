//! Conversation store
//!
//! Owns the conversation list and the active-conversation pointer. Both are
//! loaded once from a [`KeyValueStore`] and written back in full after every
//! mutation. Write failures are logged and otherwise ignored so a flaky disk
//! never interrupts a conversation.

use crate::chat::conversation::{Conversation, Message};
use crate::storage::{get_or, set_json, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Key of the serialized conversation list
pub const CONVERSATIONS_KEY: &str = "emobuddy-conversations";

/// Key of the serialized active-conversation id
pub const ACTIVE_CONVERSATION_KEY: &str = "emobuddy-active-conversation";

/// Overview of one conversation for history listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: String,
    /// Display title
    pub title: String,
    /// Number of messages, greeting included
    pub message_count: usize,
    /// Time of the latest message
    pub last_activity: Option<DateTime<Utc>>,
    /// Whether this is the active conversation
    pub is_active: bool,
}

/// In-memory conversation list backed by a key-value store
pub struct ConversationStore {
    kv: Arc<dyn KeyValueStore>,
    conversations: Vec<Conversation>,
    active_id: String,
}

impl ConversationStore {
    /// Load state from `kv`, repairing it where needed
    ///
    /// A missing or unreadable list yields the first-run conversation. An
    /// empty list is reseeded, duplicate ids are dropped (first one wins) and
    /// an active id that matches nothing is moved to the first conversation.
    /// Repairs are written back immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use emobuddy::chat::ConversationStore;
    /// use emobuddy::storage::MemoryStore;
    ///
    /// let store = ConversationStore::load(Arc::new(MemoryStore::new()));
    /// assert_eq!(store.conversations().len(), 1);
    /// assert_eq!(store.active_id(), "1");
    /// ```
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        let loaded: Vec<Conversation> =
            get_or(kv.as_ref(), CONVERSATIONS_KEY, vec![Conversation::first_run()]);
        let active_id: String = get_or(kv.as_ref(), ACTIVE_CONVERSATION_KEY, "1".to_string());

        let mut repaired = false;
        let mut seen = HashSet::new();
        let mut conversations = Vec::with_capacity(loaded.len());
        for conversation in loaded {
            if seen.insert(conversation.id().to_string()) {
                conversations.push(conversation);
            } else {
                tracing::warn!(
                    "Dropping duplicate stored conversation {}",
                    conversation.id()
                );
                repaired = true;
            }
        }

        if conversations.is_empty() {
            tracing::warn!("Stored conversation list is empty, seeding a new one");
            conversations.push(Conversation::first_run());
            repaired = true;
        }

        let mut store = Self {
            kv,
            conversations,
            active_id,
        };

        if !store.contains(&store.active_id) {
            let first = store.conversations[0].id().to_string();
            tracing::warn!(
                "Active conversation {:?} not found, switching to {}",
                store.active_id,
                first
            );
            store.active_id = first;
            repaired = true;
        }

        if repaired {
            store.save_conversations();
            store.save_active();
        }

        tracing::debug!(
            "Loaded {} conversations, active={}",
            store.conversations.len(),
            store.active_id
        );
        store
    }

    /// All conversations in list order
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// Number of conversations
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether no conversations remain
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Look up a conversation by id
    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id() == id)
    }

    /// Whether a conversation with `id` exists
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Id of the active conversation
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active conversation
    pub fn active(&self) -> Option<&Conversation> {
        self.get(&self.active_id)
    }

    /// Summaries of every conversation, in list order
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.conversations
            .iter()
            .map(|c| ConversationSummary {
                id: c.id().to_string(),
                title: c.display_title().to_string(),
                message_count: c.messages().len(),
                last_activity: c.last_activity(),
                is_active: c.id() == self.active_id,
            })
            .collect()
    }

    pub(crate) fn set_active(&mut self, id: &str) {
        self.active_id = id.to_string();
        self.save_active();
    }

    pub(crate) fn push(&mut self, conversation: Conversation) {
        self.conversations.push(conversation);
        self.save_conversations();
    }

    /// Append to the conversation with `id`; false when it does not exist
    pub(crate) fn append_message(&mut self, id: &str, message: Message) -> bool {
        match self.get_mut(id) {
            Some(conversation) => {
                conversation.push_message(message);
                self.save_conversations();
                true
            }
            None => {
                tracing::warn!("Dropping message for missing conversation {}", id);
                false
            }
        }
    }

    pub(crate) fn set_title(&mut self, id: &str, title: String) -> bool {
        match self.get_mut(id) {
            Some(conversation) => {
                conversation.set_title(title);
                self.save_conversations();
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Conversation> {
        let index = self.conversations.iter().position(|c| c.id() == id)?;
        let removed = self.conversations.remove(index);
        self.save_conversations();
        Some(removed)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id() == id)
    }

    fn save_conversations(&self) {
        if let Err(e) = set_json(self.kv.as_ref(), CONVERSATIONS_KEY, &self.conversations) {
            tracing::warn!("Failed to persist conversations: {}", e);
        }
    }

    fn save_active(&self) {
        if let Err(e) = set_json(self.kv.as_ref(), ACTIVE_CONVERSATION_KEY, &self.active_id) {
            tracing::warn!("Failed to persist active conversation: {}", e);
        }
    }
}
