//! AI augmentation stage
//!
//! One model request per run. Every failure on the model path (no provider,
//! transport error, non-2xx status, timeout, unparseable or schema-invalid
//! reply) routes to the deterministic fallback, so `generate` never fails.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::LlmConfig;
use crate::types::{
    ProjectAnalysis, Result, WorkflowAnalysisData, WorkflowGenerationResult, log_filter_warn,
};

use super::fallback::generate_fallback;
use super::prompt::build_workflow_prompt;
use super::provider::{SharedProvider, TokenUsage, create_provider};
use super::timeout::with_timeout;
use super::validation::process_reply;

/// Where a generation result came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum GenerationSource {
    Ai { provider: String, model: String },
    Fallback { reason: String },
}

impl GenerationSource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, GenerationSource::Fallback { .. })
    }
}

impl std::fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationSource::Ai { provider, model } => write!(f, "{} ({})", provider, model),
            GenerationSource::Fallback { reason } => write!(f, "deterministic fallback: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AugmentationOutcome {
    pub result: WorkflowGenerationResult,
    pub source: GenerationSource,
    /// Token usage of the model call, when one succeeded
    pub usage: Option<TokenUsage>,
}

pub struct AugmentationStage {
    provider: Option<SharedProvider>,
    timeout: Duration,
    max_tokens: u32,
}

impl AugmentationStage {
    pub fn new(provider: Option<SharedProvider>, config: &LlmConfig) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(config.timeout_secs),
            max_tokens: config.max_output_tokens,
        }
    }

    /// Build from config; a provider that cannot be constructed counts as absent
    pub fn from_config(config: &LlmConfig) -> Self {
        let provider = log_filter_warn(create_provider(config), "LLM provider unavailable").flatten();
        Self::new(provider, config)
    }

    /// Stage that never calls a model
    pub fn deterministic(config: &LlmConfig) -> Self {
        Self::new(None, config)
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate(
        &self,
        analysis: &ProjectAnalysis,
        data: &WorkflowAnalysisData,
    ) -> AugmentationOutcome {
        let Some(provider) = &self.provider else {
            info!("No LLM provider configured, using deterministic workflow generation");
            return fallback(analysis, data, "no provider configured".to_string());
        };

        match self.request(provider, analysis, data).await {
            Ok((result, usage)) => {
                info!(
                    "Generated {} workflows and {} user stories with {}",
                    result.workflows.len(),
                    result.user_stories.len(),
                    provider.name()
                );
                AugmentationOutcome {
                    result,
                    source: GenerationSource::Ai {
                        provider: provider.name().to_string(),
                        model: provider.model().to_string(),
                    },
                    usage: Some(usage),
                }
            }
            Err(e) => {
                warn!("Workflow generation via {} failed, falling back: {}", provider.name(), e);
                fallback(analysis, data, e.to_string())
            }
        }
    }

    async fn request(
        &self,
        provider: &SharedProvider,
        analysis: &ProjectAnalysis,
        data: &WorkflowAnalysisData,
    ) -> Result<(WorkflowGenerationResult, TokenUsage)> {
        let prompt = build_workflow_prompt(analysis, data);
        let response = with_timeout(
            self.timeout,
            provider.complete(&prompt, self.max_tokens),
            "workflow generation",
        )
        .await?;
        let result = process_reply(&response.content)?;
        Ok((result, response.usage))
    }
}

fn fallback(
    analysis: &ProjectAnalysis,
    data: &WorkflowAnalysisData,
    reason: String,
) -> AugmentationOutcome {
    AugmentationOutcome {
        result: generate_fallback(analysis, data),
        source: GenerationSource::Fallback { reason },
        usage: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{LlmProvider, LlmResponse};
    use crate::analyzer::analyze_project;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};
    use crate::types::{ErrorCategory, ErrorClassifier, ScribeError};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double replaying one canned outcome
    struct ScriptedProvider {
        reply: std::result::Result<String, u16>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                delay: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn hanging() -> Arc<Self> {
            Arc::new(Self {
                reply: Ok("{}".to_string()),
                delay: Some(Duration::from_secs(5)),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn complete(&self, _prompt: &str, _max_tokens: u32) -> Result<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Ok(text) => {
                    let mut response = LlmResponse::content_only(text.clone());
                    response.usage = TokenUsage::new(100, 20);
                    Ok(response)
                }
                Err(status) => Err(ScribeError::Llm(ErrorClassifier::classify_http_status(
                    *status, "scripted", "scripted",
                ))),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-1"
        }
    }

    fn inputs() -> (ProjectAnalysis, WorkflowAnalysisData) {
        let mut root = ingest_files(
            "shop",
            vec![RawFile::new(
                "src/auth.ts",
                b"export function login(user: string) { return user; }\n".to_vec(),
            )],
        );
        apply_filters(&mut root, &FilterOptions::default());
        let analysis = analyze_project(&root, "shop");
        let data = crate::workflow::extract_workflows(&analysis);
        (analysis, data)
    }

    fn stage(provider: Arc<ScriptedProvider>) -> AugmentationStage {
        let config = LlmConfig {
            timeout_secs: 1,
            ..Default::default()
        };
        let provider: SharedProvider = provider;
        AugmentationStage::new(Some(provider), &config)
    }

    #[tokio::test]
    async fn test_valid_reply_is_used_and_repaired() {
        let provider = ScriptedProvider::replying(
            "```json\n{\"workflows\": [{\"id\": \"login\", \"name\": \"Sign in\", \"steps\": [\"Enter email\"]}],\n\"userStories\": [{\"id\": \"s1\", \"title\": \"Sign in\", \"priority\": \"urgent\", \"workflowId\": \"login\"}]}\n```",
        );
        let (analysis, data) = inputs();
        let outcome = stage(provider.clone()).generate(&analysis, &data).await;

        assert_eq!(
            outcome.source,
            GenerationSource::Ai {
                provider: "scripted".into(),
                model: "scripted-1".into()
            }
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.usage, Some(TokenUsage::new(100, 20)));
        let story = &outcome.result.user_stories[0];
        assert_eq!(story.id, "US001");
        assert_eq!(story.workflow_id.as_deref(), Some("WF001"));
        assert_eq!(story.priority, crate::types::Priority::Medium);
        assert_eq!(outcome.result.workflows[0].steps[0].order, 1);
    }

    #[tokio::test]
    async fn test_schema_invalid_reply_falls_back() {
        let provider = ScriptedProvider::replying("{\"summary\": \"I found nothing\"}");
        let (analysis, data) = inputs();
        let outcome = stage(provider).generate(&analysis, &data).await;
        assert!(outcome.source.is_fallback());
        assert!(outcome.usage.is_none());
        assert!(!outcome.result.user_stories.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let provider = ScriptedProvider::replying("Sorry, I can't help with that.");
        let (analysis, data) = inputs();
        let outcome = stage(provider).generate(&analysis, &data).await;
        assert!(outcome.source.is_fallback());
    }

    #[tokio::test]
    async fn test_http_error_falls_back_without_retry() {
        let provider = ScriptedProvider::failing(503);
        let (analysis, data) = inputs();
        let outcome = stage(provider.clone()).generate(&analysis, &data).await;
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        match &outcome.source {
            GenerationSource::Fallback { reason } => {
                assert!(reason.contains(&ErrorCategory::Transient.to_string()))
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let (analysis, data) = inputs();
        let outcome = stage(ScriptedProvider::hanging()).generate(&analysis, &data).await;
        match &outcome.source {
            GenerationSource::Fallback { reason } => assert!(reason.contains("Timeout")),
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_provider_matches_direct_fallback() {
        let (analysis, data) = inputs();
        let outcome = AugmentationStage::deterministic(&LlmConfig::default())
            .generate(&analysis, &data)
            .await;
        assert!(outcome.source.is_fallback());
        assert_eq!(outcome.result, generate_fallback(&analysis, &data));
        let login = outcome
            .result
            .user_stories
            .iter()
            .find(|s| s.title == "Login")
            .unwrap();
        assert!(login.id.starts_with("US"));
    }
}
