//! Conversation controller
//!
//! Ties the [`ConversationStore`] to a live [`ChatSession`]. Every operation
//! the UI can trigger goes through here: sending a message, starting,
//! switching and deleting conversations. The session always mirrors the
//! active conversation's history and is rebuilt whenever the active
//! conversation changes.

use crate::chat::conversation::{derive_title, Conversation, Message, APOLOGY_MESSAGE};
use crate::chat::store::{ConversationStore, ConversationSummary};
use crate::error::{EmobuddyError, Result};
use crate::providers::{ChatProvider, ChatSession};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag raised while a reply is pending
///
/// Cloning is cheap and every clone observes the same flag, so a UI task can
/// poll it while the controller is busy awaiting the remote model.
#[derive(Debug, Clone, Default)]
pub struct TypingIndicator(Arc<AtomicBool>);

impl TypingIndicator {
    /// Whether a reply is currently pending
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn set(&self, active: bool) {
        self.0.store(active, Ordering::SeqCst);
    }
}

/// Orchestrates conversations and the remote chat session
pub struct ConversationController {
    store: ConversationStore,
    provider: Arc<dyn ChatProvider>,
    session: Option<Box<dyn ChatSession>>,
    typing: TypingIndicator,
}

impl ConversationController {
    /// Create a controller; call [`initialize`](Self::initialize) before sending
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use emobuddy::chat::{ConversationController, ConversationStore};
    /// use emobuddy::config::GeminiConfig;
    /// use emobuddy::providers::GeminiProvider;
    /// use emobuddy::storage::MemoryStore;
    ///
    /// let store = ConversationStore::load(Arc::new(MemoryStore::new()));
    /// let provider = GeminiProvider::with_api_key(GeminiConfig::default(), None).unwrap();
    /// let mut controller = ConversationController::new(store, Arc::new(provider));
    /// assert!(!controller.is_ready());
    /// controller.initialize();
    /// assert!(controller.is_ready());
    /// ```
    pub fn new(store: ConversationStore, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            store,
            provider,
            session: None,
            typing: TypingIndicator::default(),
        }
    }

    /// Open a remote session for the active conversation
    pub fn initialize(&mut self) {
        self.rebuild_session();
        tracing::info!(
            "Chat ready with {} ({}), active conversation {}",
            self.provider.name(),
            self.provider.model(),
            self.store.active_id()
        );
    }

    /// Whether a session exists and messages can be sent
    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    /// Whether a reply is currently pending
    pub fn is_typing(&self) -> bool {
        self.typing.is_active()
    }

    /// Handle to the typing flag for observers outside the controller
    pub fn typing_indicator(&self) -> TypingIndicator {
        self.typing.clone()
    }

    /// All conversations in list order
    pub fn conversations(&self) -> &[Conversation] {
        self.store.conversations()
    }

    /// Look up a conversation by id
    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.store.get(id)
    }

    /// The active conversation
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.store.active()
    }

    /// Id of the active conversation
    pub fn active_id(&self) -> &str {
        self.store.active_id()
    }

    /// History overview of every conversation
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.store.summaries()
    }

    /// Send a user message in the active conversation
    ///
    /// Blank input, or input before [`initialize`](Self::initialize), is
    /// ignored and returns `None`. Otherwise the user message is stored, the
    /// title is derived if the conversation still has the placeholder title,
    /// and the model's reply is appended. A failed remote call appends
    /// [`APOLOGY_MESSAGE`] instead. Returns the appended assistant message.
    pub async fn send_message(&mut self, text: &str) -> Option<Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Ignoring message sent before the chat session was ready");
            return None;
        };

        let conversation_id = self.store.active_id().to_string();
        let needs_title = match self.store.active() {
            Some(conversation) => conversation.has_placeholder_title(),
            None => {
                tracing::warn!("No active conversation, dropping message");
                return None;
            }
        };

        self.store.append_message(&conversation_id, Message::user(text));
        if needs_title {
            self.store.set_title(&conversation_id, derive_title(text));
        }

        self.typing.set(true);
        let result = session.send_message(text).await;
        self.typing.set(false);

        let reply = match result {
            Ok(reply) => {
                tracing::debug!("Received reply of {} chars", reply.chars().count());
                Message::assistant(reply)
            }
            Err(e) => {
                tracing::error!("Failed to get reply in {}: {:#}", conversation_id, e);
                Message::assistant(APOLOGY_MESSAGE)
            }
        };

        self.store.append_message(&conversation_id, reply.clone());
        Some(reply)
    }

    /// Start a new conversation with a greeting and make it active
    ///
    /// Returns the new conversation's id.
    pub fn start_new_conversation(&mut self) -> String {
        let conversation = Conversation::started();
        let id = conversation.id().to_string();
        self.store.push(conversation);
        self.store.set_active(&id);
        self.rebuild_session();
        tracing::info!("Started conversation {}", id);
        id
    }

    /// Make `id` the active conversation
    ///
    /// # Errors
    ///
    /// Returns [`EmobuddyError::ConversationNotFound`] when no conversation
    /// has that id; the active conversation is left unchanged.
    pub fn switch_conversation(&mut self, id: &str) -> Result<()> {
        if !self.store.contains(id) {
            return Err(EmobuddyError::ConversationNotFound(id.to_string()).into());
        }
        self.store.set_active(id);
        self.rebuild_session();
        tracing::info!("Switched to conversation {}", id);
        Ok(())
    }

    /// Delete the conversation `id`
    ///
    /// Deleting the last remaining conversation starts a fresh one. Deleting
    /// the active conversation activates the first remaining one. Returns
    /// false, changing nothing, when `id` is unknown.
    pub fn delete_conversation(&mut self, id: &str) -> bool {
        if self.store.remove(id).is_none() {
            tracing::debug!("Delete ignored, no conversation {}", id);
            return false;
        }
        tracing::info!("Deleted conversation {}", id);

        if self.store.is_empty() {
            self.start_new_conversation();
        } else if self.store.active_id() == id {
            let next = self.store.conversations()[0].id().to_string();
            self.store.set_active(&next);
            self.rebuild_session();
        }
        true
    }

    fn rebuild_session(&mut self) {
        let history = self
            .store
            .active()
            .map(Conversation::history)
            .unwrap_or_default();
        tracing::debug!(
            "Opening session for {} with {} turns of history",
            self.store.active_id(),
            history.len()
        );
        self.session = Some(self.provider.start_chat(history));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::conversation::{
        Role, FIRST_CONVERSATION_TITLE, NEW_CONVERSATION_GREETING, NEW_CONVERSATION_TITLE,
    };
    use crate::providers::ChatTurn;
    use crate::storage::{KeyValueStore, MemoryStore};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every session it opens and answers with canned replies
    #[derive(Default)]
    struct MockProvider {
        replies: Arc<Mutex<Vec<Result<String>>>>,
        opened: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
        seen_typing: Arc<Mutex<Vec<bool>>>,
        indicator: Arc<Mutex<Option<TypingIndicator>>>,
    }

    impl MockProvider {
        fn reply_with(&self, reply: Result<String>) {
            self.replies.lock().unwrap().push(reply);
        }

        fn opened(&self) -> Vec<Vec<ChatTurn>> {
            self.opened.lock().unwrap().clone()
        }
    }

    struct MockSession {
        history: Vec<ChatTurn>,
        replies: Arc<Mutex<Vec<Result<String>>>>,
        seen_typing: Arc<Mutex<Vec<bool>>>,
        indicator: Arc<Mutex<Option<TypingIndicator>>>,
    }

    #[async_trait]
    impl ChatSession for MockSession {
        async fn send_message(&mut self, text: &str) -> Result<String> {
            if let Some(indicator) = self.indicator.lock().unwrap().as_ref() {
                self.seen_typing.lock().unwrap().push(indicator.is_active());
            }
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.is_empty() {
                Ok(format!("echo: {}", text))
            } else {
                replies.remove(0)
            };
            if let Ok(reply) = &reply {
                self.history.push(ChatTurn::user(text));
                self.history.push(ChatTurn::model(reply.as_str()));
            }
            reply
        }

        fn history(&self) -> &[ChatTurn] {
            &self.history
        }
    }

    impl ChatProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        fn start_chat(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession> {
            self.opened.lock().unwrap().push(history.clone());
            Box::new(MockSession {
                history,
                replies: self.replies.clone(),
                seen_typing: self.seen_typing.clone(),
                indicator: self.indicator.clone(),
            })
        }
    }

    fn setup() -> (ConversationController, Arc<MockProvider>, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        let provider = Arc::new(MockProvider::default());
        let store = ConversationStore::load(kv.clone());
        let mut controller = ConversationController::new(store, provider.clone());
        controller.initialize();
        (controller, provider, kv)
    }

    #[tokio::test]
    async fn test_send_before_initialize_is_noop() {
        let kv = Arc::new(MemoryStore::new());
        let provider = Arc::new(MockProvider::default());
        let mut controller =
            ConversationController::new(ConversationStore::load(kv), provider.clone());

        assert!(controller.send_message("hello").await.is_none());
        assert_eq!(controller.active_conversation().unwrap().messages().len(), 1);
        assert!(provider.opened().is_empty());
    }

    #[tokio::test]
    async fn test_send_blank_message_is_noop() {
        let (mut controller, _, _) = setup();
        assert!(controller.send_message("   \n\t").await.is_none());
        assert_eq!(controller.active_conversation().unwrap().messages().len(), 1);
    }

    #[tokio::test]
    async fn test_send_appends_user_and_reply() {
        let (mut controller, provider, _) = setup();
        provider.reply_with(Ok("That sounds hard.".to_string()));

        let reply = controller.send_message("  I feel low  ").await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "That sounds hard.");

        let messages = controller.active_conversation().unwrap().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "I feel low");
        assert_eq!(messages[2], reply);
        assert!(!controller.is_typing());
    }

    #[tokio::test]
    async fn test_failed_reply_appends_apology() {
        let (mut controller, provider, _) = setup();
        provider.reply_with(Err(EmobuddyError::Provider("boom".into()).into()));

        let reply = controller.send_message("hello").await.unwrap();
        assert_eq!(reply.content, APOLOGY_MESSAGE);
        assert_eq!(controller.active_conversation().unwrap().messages().len(), 3);
        assert!(!controller.is_typing());
    }

    #[tokio::test]
    async fn test_typing_flag_raised_while_waiting() {
        let (mut controller, provider, _) = setup();
        *provider.indicator.lock().unwrap() = Some(controller.typing_indicator());

        controller.send_message("first").await;
        provider.reply_with(Err(EmobuddyError::Provider("down".into()).into()));
        controller.send_message("second").await;

        assert_eq!(*provider.seen_typing.lock().unwrap(), vec![true, true]);
        assert!(!controller.is_typing());
    }

    #[tokio::test]
    async fn test_first_run_title_is_kept() {
        let (mut controller, _, _) = setup();
        controller.send_message("Something new").await;
        assert_eq!(
            controller.active_conversation().unwrap().title(),
            FIRST_CONVERSATION_TITLE
        );
    }

    #[tokio::test]
    async fn test_placeholder_title_derived_from_first_message_only() {
        let (mut controller, _, _) = setup();
        controller.start_new_conversation();

        controller
            .send_message("I could not sleep at all last night and I am tired")
            .await;
        assert_eq!(
            controller.active_conversation().unwrap().title(),
            "I could not sleep at all last ..."
        );

        controller.send_message("Another message").await;
        assert_eq!(
            controller.active_conversation().unwrap().title(),
            "I could not sleep at all last ..."
        );
    }

    #[test]
    fn test_start_new_conversation() {
        let (mut controller, provider, _) = setup();
        let id = controller.start_new_conversation();

        assert_eq!(controller.active_id(), id);
        assert_eq!(controller.conversations().len(), 2);
        let active = controller.active_conversation().unwrap();
        assert_eq!(active.title(), NEW_CONVERSATION_TITLE);
        assert_eq!(active.messages()[0].content, NEW_CONVERSATION_GREETING);
        assert!(active.welcome_message_sent());

        let opened = provider.opened();
        assert_eq!(opened.len(), 2);
        assert!(opened[1].is_empty());
    }

    #[tokio::test]
    async fn test_switch_rebuilds_session_with_history() {
        let (mut controller, provider, _) = setup();
        controller.send_message("hi").await;
        controller.start_new_conversation();

        controller.switch_conversation("1").unwrap();
        assert_eq!(controller.active_id(), "1");

        let last = provider.opened().pop().unwrap();
        assert_eq!(last, vec![ChatTurn::user("hi"), ChatTurn::model("echo: hi")]);
    }

    #[test]
    fn test_switch_to_unknown_id_fails_and_keeps_state() {
        let (mut controller, provider, _) = setup();
        let sessions_before = provider.opened().len();

        let err = controller.switch_conversation("missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EmobuddyError>(),
            Some(EmobuddyError::ConversationNotFound(id)) if id == "missing"
        ));
        assert_eq!(controller.active_id(), "1");
        assert_eq!(provider.opened().len(), sessions_before);
    }

    #[test]
    fn test_delete_unknown_is_noop() {
        let (mut controller, _, _) = setup();
        assert!(!controller.delete_conversation("missing"));
        assert_eq!(controller.conversations().len(), 1);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let (mut controller, _, _) = setup();
        let id = controller.start_new_conversation();

        assert!(controller.delete_conversation("1"));
        assert_eq!(controller.active_id(), id);
        assert_eq!(controller.conversations().len(), 1);
    }

    #[test]
    fn test_delete_active_selects_first_remaining() {
        let (mut controller, _, _) = setup();
        let id = controller.start_new_conversation();

        assert!(controller.delete_conversation(&id));
        assert_eq!(controller.active_id(), "1");
        assert!(controller.conversation(&id).is_none());
    }

    #[test]
    fn test_delete_last_conversation_starts_fresh_one() {
        let (mut controller, _, kv) = setup();

        assert!(controller.delete_conversation("1"));
        assert_eq!(controller.conversations().len(), 1);
        let active = controller.active_conversation().unwrap();
        assert_ne!(active.id(), "1");
        assert_eq!(active.title(), NEW_CONVERSATION_TITLE);
        assert!(kv.get("emobuddy-conversations").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_state_survives_reload() {
        let (mut controller, _, kv) = setup();
        controller.send_message("remember me").await;
        let id = controller.start_new_conversation();

        let reloaded = ConversationStore::load(kv);
        assert_eq!(reloaded.active_id(), id);
        assert_eq!(reloaded.get("1").unwrap().messages().len(), 3);
    }
}
