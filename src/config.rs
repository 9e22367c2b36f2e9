//! Configuration management for EmoBuddy
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{EmobuddyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for EmoBuddy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote model configuration
    pub provider: ProviderConfig,
    /// Where conversation state is kept
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Google Gemini provider configuration
///
/// The generation parameters are fixed per deployment; the conversation
/// logic never changes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model identifier, including the `models/` or `tunedModels/` prefix
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL (useful for tests and local mocks)
    #[serde(default = "default_gemini_api_base")]
    pub api_base: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling bound
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Top-k sampling bound
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Maximum reply length in tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_gemini_model() -> String {
    "tunedModels/mental-ai-f1my9p0ommji".to_string()
}

fn default_gemini_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    1.0
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    64
}

fn default_max_output_tokens() -> u32 {
    300
}

fn default_timeout_seconds() -> u64 {
    120
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_gemini_model(),
            api_base: default_gemini_api_base(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GeminiConfig {
    /// Read the API key from the configured environment variable
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

/// Storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Store directory; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                provider_type: "gemini".to_string(),
                gemini: GeminiConfig::default(),
            },
            storage: StorageConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(EmobuddyError::Io)?;
        let config = serde_yaml::from_str(&contents).map_err(EmobuddyError::Yaml)?;
        Ok(config)
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("EMOBUDDY_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("EMOBUDDY_GEMINI_MODEL") {
            self.provider.gemini.model = model;
        }

        if let Ok(api_base) = std::env::var("EMOBUDDY_GEMINI_API_BASE") {
            self.provider.gemini.api_base = api_base;
        }

        if let Ok(temperature) = std::env::var("EMOBUDDY_GEMINI_TEMPERATURE") {
            if let Ok(value) = temperature.parse::<f32>() {
                self.provider.gemini.temperature = value;
            } else {
                tracing::warn!("Ignoring invalid EMOBUDDY_GEMINI_TEMPERATURE: {}", temperature);
            }
        }

        if let Ok(max_tokens) = std::env::var("EMOBUDDY_GEMINI_MAX_OUTPUT_TOKENS") {
            if let Ok(value) = max_tokens.parse::<u32>() {
                self.provider.gemini.max_output_tokens = value;
            } else {
                tracing::warn!(
                    "Ignoring invalid EMOBUDDY_GEMINI_MAX_OUTPUT_TOKENS: {}",
                    max_tokens
                );
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        let store_path = cli
            .store_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty());
        if let Some(store_path) = store_path {
            self.storage.path = Some(store_path.to_string());
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(EmobuddyError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(EmobuddyError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        let gemini = &self.provider.gemini;

        if gemini.model.trim().is_empty() {
            return Err(EmobuddyError::Config("gemini.model cannot be empty".to_string()).into());
        }

        if gemini.api_base.trim().is_empty() {
            return Err(
                EmobuddyError::Config("gemini.api_base cannot be empty".to_string()).into(),
            );
        }

        if !(0.0..=2.0).contains(&gemini.temperature) {
            return Err(EmobuddyError::Config(
                "gemini.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if gemini.top_p <= 0.0 || gemini.top_p > 1.0 {
            return Err(EmobuddyError::Config(
                "gemini.top_p must be greater than 0.0 and at most 1.0".to_string(),
            )
            .into());
        }

        if gemini.top_k == 0 {
            return Err(
                EmobuddyError::Config("gemini.top_k must be greater than 0".to_string()).into(),
            );
        }

        if gemini.max_output_tokens == 0 {
            return Err(EmobuddyError::Config(
                "gemini.max_output_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if gemini.timeout_seconds == 0 {
            return Err(EmobuddyError::Config(
                "gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
