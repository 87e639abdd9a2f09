//! codescribe - Documentation Generator for Source Projects
//!
//! Ingests a project (directory, zip archive or loose files), filters out
//! noise, recovers symbols with lightweight pattern matching, classifies
//! dependencies and architecture, and renders documentation. Workflow and
//! user-story generation goes through an LLM provider when one is
//! configured, with a deterministic local generator otherwise.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use codescribe::{AugmentationStage, DocumentationPipeline, IngestInput, PipelineOptions};
//! use codescribe::usage::UnmeteredGate;
//!
//! let config = codescribe::ConfigLoader::load()?;
//! let pipeline = DocumentationPipeline::new(
//!     Arc::new(UnmeteredGate),
//!     AugmentationStage::from_config(&config.llm),
//! );
//! let input = IngestInput::from_path("./my-app".as_ref()).await?;
//! let output = pipeline.run(input, &PipelineOptions::from_config(&config)).await?;
//! println!("{}", output.document.content);
//! ```
//!
//! ## Modules
//!
//! - [`ingest`]: tree construction from uploads, archives and directories
//! - [`filter`]: noise removal and file classification
//! - [`analyzer`]: symbol extraction, dependency and architecture classification
//! - [`workflow`]: route, UI, data-access, auth and business-logic signals
//! - [`docs`]: standard, professional and AI-optimized documents, export
//! - [`ai`]: LLM providers, prompt, reply repair, deterministic fallback
//! - [`usage`]: usage permission gate
//! - [`pipeline`]: end-to-end orchestration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod filter;
pub mod ingest;
pub mod pipeline;
pub mod types;
pub mod usage;
pub mod workflow;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};
pub use types::error::{ErrorCategory, Result, ScribeError};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use ingest::IngestInput;
pub use pipeline::{DocumentationPipeline, PipelineOptions, PipelineOutput};

// =============================================================================
// Document Re-exports
// =============================================================================

pub use docs::{ExportFormat, ExportPayload, ProfessionalConfig, export};
pub use types::{GeneratedDoc, ProfessionalDoc, ProjectAnalysis, WorkflowGenerationResult};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{AugmentationStage, GenerationSource, LlmProvider, LlmResponse, SharedProvider};
