//! Anthropic Messages API Provider

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ResponseMetadata, ResponseTiming, TokenUsage,
    http_client,
};
use crate::config::LlmConfig;
use crate::constants::llm;
use crate::types::{ErrorCategory, LlmError, Result};

const PROVIDER: &str = "anthropic";

const SYSTEM_PROMPT: &str = "You are a product analyst documenting software. Respond only with the requested JSON.";

pub struct AnthropicProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(config: &LlmConfig, api_key: SecretString) -> Result<Self> {
        Ok(Self {
            api_key,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| llm::ANTHROPIC_API_BASE.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            client: http_client(config.timeout_secs)?,
        })
    }

    fn build_request<'a>(&'a self, prompt: &'a str, max_tokens: u32) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature: self.temperature,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<LlmResponse> {
        info!("Generating with Anthropic (model: {})", self.model);

        let start_time = Instant::now();
        let url = format!("{}/messages", self.api_base.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", llm::ANTHROPIC_VERSION)
            .json(&self.build_request(prompt, max_tokens))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(status.as_u16(), &body, PROVIDER).into());
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;
        let elapsed = start_time.elapsed();

        let content: String = body
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();
        if content.is_empty() {
            return Err(LlmError::with_provider(
                ErrorCategory::ParseError,
                "No text blocks in response",
                PROVIDER,
            )
            .into());
        }

        let usage = body
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();
        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            stop_reason = body.stop_reason.as_deref().unwrap_or("unknown"),
            "Received response from Anthropic"
        );

        Ok(LlmResponse {
            content,
            usage,
            timing: ResponseTiming::from_duration(elapsed),
            metadata: ResponseMetadata {
                model: body.model.unwrap_or_else(|| self.model.clone()),
                provider: PROVIDER.to_string(),
            },
        })
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    model: Option<String>,
    stop_reason: Option<String>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let provider =
            AnthropicProvider::new(&LlmConfig::default(), SecretString::from("sk-ant")).unwrap();
        let request = serde_json::to_value(provider.build_request("describe", 1024)).unwrap();
        assert_eq!(request["model"], llm::DEFAULT_MODEL);
        assert_eq!(request["max_tokens"], 1024);
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][0]["content"], "describe");
        assert!(!format!("{:?}", provider).contains("sk-ant"));
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "content": [{"type": "text", "text": "{\"a\":"}, {"type": "text", "text": "1}"}],
            "model": "claude-x",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 3}
        }"#;
        let body: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text: String = body.content.iter().filter_map(|b| b.text.as_deref()).collect();
        assert_eq!(text, "{\"a\":1}");
        assert_eq!(body.usage.unwrap().input_tokens, 12);
    }
}
