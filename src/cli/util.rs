//! CLI Common Utilities
//!
//! Shared setup for command handlers: configuration, pipeline wiring,
//! input resolution and writing artifacts to disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::ai::AugmentationStage;
use crate::config::{Config, ConfigLoader};
use crate::docs::ExportPayload;
use crate::ingest::IngestInput;
use crate::pipeline::{DocumentationPipeline, PipelineOptions};
use crate::types::{Result, ScribeError};
use crate::usage::{UsageGate, gate_from_config};

use super::ui::Output;

/// Command execution context
///
/// Holds the merged configuration and the output sink. Created once per
/// command via `CommandContext::load()`.
pub struct CommandContext {
    pub config: Config,
    pub output: Output,
}

impl CommandContext {
    /// Load configuration from all sources (defaults → global → project → env)
    pub fn load(quiet: bool) -> Result<Self> {
        let config = ConfigLoader::load()?;
        Ok(Self {
            config,
            output: Output::quiet(quiet),
        })
    }

    /// Pipeline wired with the configured usage gate
    pub fn pipeline(&self, augmentation: AugmentationStage) -> DocumentationPipeline {
        let gate: Arc<dyn UsageGate> = Arc::from(gate_from_config(&self.config.usage));
        DocumentationPipeline::new(gate, augmentation)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::from_config(&self.config)
    }

    /// `--output` when given, otherwise the configured directory
    pub fn output_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override.unwrap_or_else(|| self.config.documentation.output_dir.clone())
    }
}

/// Resolve a CLI path argument into pipeline input
pub async fn resolve_input(path: &Path) -> Result<IngestInput> {
    if !path.exists() {
        return Err(ScribeError::ingest(
            path.display().to_string(),
            "path does not exist",
        ));
    }
    IngestInput::from_path(path).await
}

/// Write an export payload into `dir`, creating it when missing
pub fn write_payload(dir: &Path, payload: &ExportPayload) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(&payload.file_name);
    std::fs::write(&target, &payload.bytes)?;
    debug!("Wrote {} bytes to {}", payload.bytes.len(), target.display());
    Ok(target)
}

/// Write a rendered text file into `dir`
pub fn write_text(dir: &Path, file_name: &str, text: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(file_name);
    std::fs::write(&target, text)?;
    Ok(target)
}

pub fn is_initialized() -> bool {
    ConfigLoader::is_project_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::ExportFormat;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_resolve_input_rejects_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = resolve_input(&dir.path().join("nope")).await.unwrap_err();
        assert!(matches!(err, ScribeError::Ingest { .. }));
    }

    #[tokio::test]
    async fn test_resolve_input_picks_archive_or_directory() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            resolve_input(dir.path()).await.unwrap(),
            IngestInput::Directory(_)
        ));

        let zip_path = dir.path().join("demo.zip");
        std::fs::write(&zip_path, b"PK").unwrap();
        match resolve_input(&zip_path).await.unwrap() {
            IngestInput::Archive { name, bytes } => {
                assert_eq!(name, "demo.zip");
                assert_eq!(bytes, b"PK");
            }
            other => panic!("expected archive, got {:?}", other),
        }
    }

    #[test]
    fn test_write_payload_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested/out");
        let payload = ExportPayload {
            bytes: b"# Title\n".to_vec(),
            file_name: "doc.md".to_string(),
            mime_type: ExportFormat::Markdown.mime_type(),
        };
        let written = write_payload(&out, &payload).unwrap();
        assert_eq!(written, out.join("doc.md"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), "# Title\n");
    }
}
