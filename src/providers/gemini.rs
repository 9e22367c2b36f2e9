//! Google Gemini provider implementation for EmoBuddy
//!
//! Sessions are stateless on the wire: every request carries the full
//! history plus the new user turn to `:generateContent`, and the session
//! records the exchange locally once the reply arrives.
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL, so
//! request errors that echo the URL cannot expose it.

use crate::config::GeminiConfig;
use crate::error::{EmobuddyError, Result};
use crate::providers::{ChatProvider, ChatRole, ChatSession, ChatTurn};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini API provider
///
/// Holds one HTTP client shared by every session it starts.
///
/// # Examples
///
/// ```no_run
/// use emobuddy::config::GeminiConfig;
/// use emobuddy::providers::{ChatProvider, GeminiProvider};
///
/// # async fn example() -> emobuddy::error::Result<()> {
/// let provider = GeminiProvider::new(GeminiConfig::default())?;
/// let mut session = provider.start_chat(vec![]);
/// let reply = session.send_message("I feel anxious today").await?;
/// println!("{}", reply);
/// # Ok(())
/// # }
/// ```
pub struct GeminiProvider {
    inner: Arc<GeminiClient>,
}

/// State shared between the provider and its sessions
struct GeminiClient {
    client: Client,
    config: GeminiConfig,
    api_key: Option<String>,
}

/// Request body for `:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

/// Response body from `:generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// The API key is read from the environment variable named by
    /// `config.api_key_env`. A missing key is not an error here: it is
    /// logged, and every send on a session of this provider fails with
    /// `EmobuddyError::MissingCredentials`.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config.api_key();
        Self::with_api_key(config, api_key)
    }

    /// Create a provider with an explicit API key
    ///
    /// # Examples
    ///
    /// ```
    /// use emobuddy::config::GeminiConfig;
    /// use emobuddy::providers::{ChatProvider, GeminiProvider};
    ///
    /// let provider = GeminiProvider::with_api_key(GeminiConfig::default(), Some("key".into())).unwrap();
    /// assert_eq!(provider.model(), "tunedModels/mental-ai-f1my9p0ommji");
    /// ```
    pub fn with_api_key(config: GeminiConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("emobuddy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EmobuddyError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        if api_key.is_none() {
            tracing::warn!(
                "No Gemini API key found in {}; replies will fail until it is set",
                config.api_key_env
            );
        }

        tracing::info!("Initialized Gemini provider: model={}", config.model);

        Ok(Self {
            inner: Arc::new(GeminiClient {
                client,
                config,
                api_key,
            }),
        })
    }

}

impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.inner.config.model
    }

    fn start_chat(&self, history: Vec<ChatTurn>) -> Box<dyn ChatSession> {
        tracing::debug!("Starting Gemini chat with {} history turns", history.len());
        Box::new(GeminiChatSession {
            client: Arc::clone(&self.inner),
            history,
        })
    }
}

/// Chat session against the Gemini API
pub struct GeminiChatSession {
    client: Arc<GeminiClient>,
    history: Vec<ChatTurn>,
}

impl GeminiClient {
    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, history: &[ChatTurn], text: &str) -> GeminiRequest {
        let contents = history
            .iter()
            .chain(std::iter::once(&ChatTurn::user(text)))
            .map(|turn| GeminiContent {
                role: turn.role.as_str().to_string(),
                parts: vec![GeminiPart {
                    text: Some(turn.text.clone()),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }

    async fn generate(&self, history: &[ChatTurn], text: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EmobuddyError::MissingCredentials("gemini".to_string()))?;

        let request = self.build_request(history, text);

        tracing::debug!(
            "Sending Gemini request: model={}, {} contents",
            self.config.model,
            request.contents.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmobuddyError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(EmobuddyError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EmobuddyError::Http(e.without_url()))?;

        extract_reply(gemini_response)
    }
}

/// Pull the reply text out of the first candidate
fn extract_reply(response: GeminiResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
    {
        return Err(EmobuddyError::Provider(format!("Prompt blocked: {}", reason)).into());
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EmobuddyError::Provider("Gemini returned no candidates".to_string()))?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(EmobuddyError::Provider(format!(
            "Gemini returned an empty reply (finish reason: {})",
            reason
        ))
        .into());
    }

    Ok(text)
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_message(&mut self, text: &str) -> Result<String> {
        let reply = self.client.generate(&self.history, text).await?;

        self.history.push(ChatTurn::user(text));
        self.history.push(ChatTurn::model(reply.clone()));

        Ok(reply)
    }

    fn history(&self) -> &[ChatTurn] {
        &self.history
    }
}
