//! Documentation pipeline
//!
//! ingest → filter → usage gate → analyze → workflows → documents → augmentation.
//! Each stage consumes only the previous stage's output.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ai::{AugmentationOutcome, AugmentationStage};
use crate::analyzer::analyze_project;
use crate::config::Config;
use crate::docs::{
    ExportFormat, ExportPayload, Exportable, ProfessionalConfig, export, generate_professional,
    generate_standard,
};
use crate::filter::{FilterOptions, FilterReport, apply_filters};
use crate::ingest::{IngestInput, ingest};
use crate::types::{
    GeneratedDoc, ProfessionalDoc, ProjectAnalysis, Result, ScribeError, WorkflowAnalysisData,
};
use crate::usage::{UsageAction, UsageEvent, UsageGate, UsageRequest};
use crate::workflow::extract_workflows;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Overrides the name implied by the input
    pub project_name: Option<String>,
    pub filter: FilterOptions,
    pub max_file_size: u64,
    pub extract_workflows: bool,
    /// Run the augmentation stage on the workflow signals
    pub generate_stories: bool,
    /// Also render a professional document
    pub professional: Option<ProfessionalConfig>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            project_name: config.project.name.clone(),
            filter: config.filter.clone().into(),
            max_file_size: config.analysis.max_file_size,
            extract_workflows: config.analysis.extract_workflows,
            generate_stories: false,
            professional: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub analysis: ProjectAnalysis,
    pub filter_report: FilterReport,
    pub document: GeneratedDoc,
    pub professional: Option<ProfessionalDoc>,
    pub workflow_data: Option<WorkflowAnalysisData>,
    pub generation: Option<AugmentationOutcome>,
}

pub struct DocumentationPipeline {
    gate: Arc<dyn UsageGate>,
    augmentation: AugmentationStage,
}

impl DocumentationPipeline {
    pub fn new(gate: Arc<dyn UsageGate>, augmentation: AugmentationStage) -> Self {
        Self { gate, augmentation }
    }

    /// Ingest, filter and analyse only (no documents)
    pub async fn analyze(&self, input: IngestInput, options: &PipelineOptions) -> Result<(ProjectAnalysis, FilterReport)> {
        let name = options
            .project_name
            .clone()
            .unwrap_or_else(|| input.default_project_name());

        let mut root = ingest(input, &name, options.max_file_size).await?;
        let report = apply_filters(&mut root, &options.filter);

        let request = UsageRequest::new(UsageAction::Analysis, &name, report.kept_files);
        self.ensure_permitted(&request).await?;

        let analysis = analyze_project(&root, &name);
        self.record(&request).await;
        Ok((analysis, report))
    }

    pub async fn run(&self, input: IngestInput, options: &PipelineOptions) -> Result<PipelineOutput> {
        let (analysis, filter_report) = self.analyze(input, options).await?;

        let workflow_data = (options.extract_workflows || options.generate_stories)
            .then(|| extract_workflows(&analysis));

        let document = generate_standard(&analysis);
        let professional = options
            .professional
            .as_ref()
            .map(|config| generate_professional(&analysis, config));
        info!(
            "Generated documentation for {} ({} sections)",
            analysis.name,
            document.sections.len()
        );

        let generation = match (&workflow_data, options.generate_stories) {
            (Some(data), true) => Some(self.augmentation.generate(&analysis, data).await),
            _ => None,
        };

        Ok(PipelineOutput {
            analysis,
            filter_report,
            document,
            professional,
            workflow_data,
            generation,
        })
    }

    /// Export one artifact, gated by the `Export` action
    pub async fn export(
        &self,
        item: &impl Exportable,
        format: ExportFormat,
        project_name: &str,
    ) -> Result<ExportPayload> {
        let request = UsageRequest::new(UsageAction::Export, project_name, 1);
        self.ensure_permitted(&request).await?;
        let payload = export(item, format)?;
        self.record(&request).await;
        Ok(payload)
    }

    async fn ensure_permitted(&self, request: &UsageRequest) -> Result<()> {
        if self.gate.is_permitted(request).await? {
            Ok(())
        } else {
            warn!("Usage gate denied {} for {}", request.action, request.project_name);
            Err(ScribeError::NotPermitted {
                action: request.action.to_string(),
            })
        }
    }

    /// Recording failures never fail the run
    async fn record(&self, request: &UsageRequest) {
        if let Err(e) = self.gate.record_usage(&UsageEvent::from(request)).await {
            warn!("Failed to record {} usage: {}", request.action, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, UsageConfig};
    use crate::ingest::RawFile;
    use crate::usage::{QuotaGate, UnmeteredGate};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn input() -> IngestInput {
        IngestInput::Files(vec![
            RawFile::new("package.json", br#"{"name":"shop","dependencies":{"react":"^18.2.0","express":"^4.18.0"}}"#.to_vec()),
            RawFile::new(
                "src/App.tsx",
                b"import React from 'react';\nexport default function App() {\n  return <div>Shop</div>;\n}\n".to_vec(),
            ),
            RawFile::new(
                "src/server.ts",
                b"const app = express();\napp.post('/api/login', (req, res) => res.json({}));\n".to_vec(),
            ),
            RawFile::new("src/App.test.tsx", b"test('renders', () => {});\n".to_vec()),
            RawFile::new("node_modules/react/index.js", b"module.exports = {};\n".to_vec()),
        ])
    }

    fn pipeline(gate: Arc<dyn UsageGate>) -> DocumentationPipeline {
        DocumentationPipeline::new(gate, AugmentationStage::deterministic(&LlmConfig::default()))
    }

    #[tokio::test]
    async fn test_full_run() {
        let options = PipelineOptions {
            project_name: Some("shop".into()),
            generate_stories: true,
            professional: Some(ProfessionalConfig::default()),
            ..Default::default()
        };
        let output = pipeline(Arc::new(UnmeteredGate)).run(input(), &options).await.unwrap();

        let paths: Vec<&str> = output.analysis.files.iter().map(|f| f.path.as_str()).collect();
        assert!(paths.contains(&"src/App.tsx"));
        assert!(!paths.iter().any(|p| p.contains("node_modules") || p.contains(".test.")));
        assert_eq!(output.document.metadata.component_count, 1);
        assert!(output.professional.is_some());

        let data = output.workflow_data.unwrap();
        assert_eq!(data.routes.len(), 1);
        let generation = output.generation.unwrap();
        assert!(generation.source.is_fallback());
        assert!(!generation.result.user_stories.is_empty());
    }

    #[tokio::test]
    async fn test_denied_gate_stops_before_analysis() {
        let gate = Arc::new(QuotaGate::new(UsageConfig {
            analysis_limit: Some(0),
            ..Default::default()
        }));
        let err = pipeline(gate).run(input(), &PipelineOptions::default()).await.unwrap_err();
        assert!(err.is_not_permitted());
    }

    /// Permits everything, fails to record, remembers requests
    #[derive(Default)]
    struct FlakyRecorder {
        seen: Mutex<Vec<UsageRequest>>,
    }

    #[async_trait]
    impl UsageGate for FlakyRecorder {
        async fn is_permitted(&self, request: &UsageRequest) -> Result<bool> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(true)
        }

        async fn record_usage(&self, _event: &UsageEvent) -> Result<()> {
            Err(ScribeError::Config("billing backend offline".into()))
        }
    }

    #[tokio::test]
    async fn test_record_failure_is_not_fatal() {
        let gate = Arc::new(FlakyRecorder::default());
        let output = pipeline(gate.clone())
            .run(input(), &PipelineOptions::default())
            .await
            .unwrap();
        assert!(output.generation.is_none());

        let seen = gate.seen.lock().unwrap();
        assert_eq!(seen[0].action, UsageAction::Analysis);
        assert_eq!(seen[0].project_name, "project");
        assert_eq!(seen[0].file_count, output.filter_report.kept_files);
    }

    #[tokio::test]
    async fn test_export_is_gated() {
        let gate = Arc::new(QuotaGate::new(UsageConfig {
            export_limit: Some(1),
            ..Default::default()
        }));
        let pipeline = pipeline(gate);
        let output = pipeline.run(input(), &PipelineOptions::default()).await.unwrap();

        let payload = pipeline
            .export(&output.document, ExportFormat::Markdown, "shop")
            .await
            .unwrap();
        assert!(payload.file_name.ends_with(".md"));
        let err = pipeline
            .export(&output.document, ExportFormat::Json, "shop")
            .await
            .unwrap_err();
        assert!(err.is_not_permitted());
    }
}
