use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use emobuddy::error::{EmobuddyError, Result};
use emobuddy::providers::{ChatProvider, ChatSession, ChatTurn};
use emobuddy::storage::{KeyValueStore, SledStore};

#[allow(dead_code)]
pub fn create_temp_store() -> (Arc<dyn KeyValueStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("store")).expect("failed to open sled store");
    (Arc::new(store), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    std::fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Provider answering from a script and recording every session it opens
#[derive(Default)]
#[allow(dead_code)]
pub struct ScriptedProvider {
    replies: Arc<Mutex<Vec<Option<String>>>>,
    opened: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push(Some(text.to_string()));
    }

    /// Queue a failed call
    pub fn fail(&self) {
        self.replies.lock().unwrap().push(None);
    }

    /// History of every session opened so far
    pub fn opened(&self) -> Vec<Vec<ChatTurn>> {
        self.opened.lock().unwrap().clone()
    }

    /// Every message text that reached a session
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

struct ScriptedSession {
    history: Vec<ChatTurn>,
    replies: Arc<Mutex<Vec<Option<String>>>>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_message(&mut self, text: &str) -> Result<String> {
        self.sent.lock().unwrap().push(text.to_string());
        let next = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                Some(format!("I hear you: {}", text))
            } else {
                replies.remove(0)
            }
        };
        match next {
            Some(reply) => {
                self.history.push(ChatTurn::user(text));
                self.history.push(ChatTurn::model(reply.as_str()));
                Ok(reply)
            }
            None => Err(EmobuddyError::Provider("scripted failure".to_string()).into()),
        }
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}

impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    fn start_chat(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession> {
        self.opened.lock().unwrap().push(history.clone());
        Box::new(ScriptedSession {
            history,
            replies: self.replies.clone(),
            sent: self.sent.clone(),
        })
    }
}
