//! AI Augmentation Stage
//!
//! Turns workflow signals into workflows and user stories through an
//! external model, with a deterministic local fallback of the same shape.

pub mod augment;
pub mod fallback;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use augment::{AugmentationOutcome, AugmentationStage, GenerationSource};
pub use fallback::generate_fallback;
pub use prompt::{PromptBuilder, PromptSection, WORKFLOW_SCHEMA, build_workflow_prompt};
pub use provider::{
    AnthropicProvider, LlmProvider, LlmResponse, OpenAiProvider, ResponseMetadata,
    ResponseTiming, SharedProvider, TokenUsage, create_provider, create_provider_with_key,
};
pub use timeout::with_timeout;
pub use validation::{
    JsonRepairer, extract_response_json, parse_generation_result, process_reply,
    repair_generation_result,
};
