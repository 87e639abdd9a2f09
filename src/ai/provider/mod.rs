//! LLM Provider Abstraction
//!
//! One text-completion call per provider. The augmentation stage owns JSON
//! extraction and repair, so providers hand back the raw reply text together
//! with usage and timing.

mod anthropic;
mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::config::LlmConfig;
use crate::types::{Result, ScribeError};

// =============================================================================
// LLM Response with Usage Metrics
// =============================================================================

#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw reply text
    pub content: String,
    pub usage: TokenUsage,
    pub timing: ResponseTiming,
    pub metadata: ResponseMetadata,
}

impl LlmResponse {
    /// Response with content only (usage unknown)
    pub fn content_only(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            timing: ResponseTiming::default(),
            metadata: ResponseMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseTiming {
    /// Wall clock time in milliseconds
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

pub type SharedProvider = Arc<dyn LlmProvider>;

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one prompt and return the reply text
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<LlmResponse>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;
}

/// Environment variable holding the API key for a provider
pub fn api_key_var(provider: &str) -> Option<&'static str> {
    match provider {
        "anthropic" | "claude" => Some("ANTHROPIC_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

/// Build the configured provider, reading its key from the environment.
///
/// `Ok(None)` means no key is configured and the caller should use the
/// deterministic fallback.
pub fn create_provider(config: &LlmConfig) -> Result<Option<SharedProvider>> {
    let key = api_key_var(&config.provider)
        .and_then(|var| std::env::var(var).ok())
        .filter(|k| !k.trim().is_empty())
        .map(SecretString::from);
    create_provider_with_key(config, key)
}

pub fn create_provider_with_key(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<Option<SharedProvider>> {
    if api_key_var(&config.provider).is_none() {
        return Err(ScribeError::Config(format!(
            "Unknown provider: {}. Supported: anthropic, openai",
            config.provider
        )));
    }

    let Some(api_key) = api_key else {
        debug!(provider = %config.provider, "No API key configured");
        return Ok(None);
    };

    let provider: SharedProvider = match config.provider.as_str() {
        "openai" => Arc::new(OpenAiProvider::new(config, api_key)?),
        _ => Arc::new(AnthropicProvider::new(config, api_key)?),
    };
    Ok(Some(provider))
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ScribeError::LlmApi(format!("Failed to create HTTP client: {}", e)))
}
