//! Docs Command
//!
//! Run the full pipeline and write the standard document (and optionally
//! a professional document) to the output directory.

use std::path::PathBuf;

use crate::ai::AugmentationStage;
use crate::cli::util::{CommandContext, resolve_input, write_payload};
use crate::docs::{ExportFormat, ProfessionalConfig};
use crate::types::{DocumentType, DocumentationStandard, Result};

#[derive(Debug, Clone)]
pub struct DocsArgs {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub professional: bool,
    pub doc_type: Option<DocumentType>,
    pub standard: Option<DocumentationStandard>,
    pub format: ExportFormat,
}

impl DocsArgs {
    /// Either override implies a professional document
    fn professional_config(&self, ctx: &CommandContext) -> Option<ProfessionalConfig> {
        if !self.professional && self.doc_type.is_none() && self.standard.is_none() {
            return None;
        }
        let mut config = ProfessionalConfig::from(&ctx.config.documentation);
        if let Some(doc_type) = self.doc_type {
            config.document_type = doc_type;
        }
        if let Some(standard) = self.standard {
            config.standard = standard;
        }
        Some(config)
    }
}

pub async fn run(ctx: &CommandContext, args: DocsArgs) -> Result<()> {
    let mut options = ctx.pipeline_options();
    options.professional = args.professional_config(ctx);

    let pipeline = ctx.pipeline(AugmentationStage::deterministic(&ctx.config.llm));
    let input = resolve_input(&args.path).await?;
    let output = pipeline.run(input, &options).await?;
    let out_dir = ctx.output_dir(args.output.clone());
    let project = output.analysis.name.as_str();

    let payload = pipeline.export(&output.document, args.format, project).await?;
    let written = write_payload(&out_dir, &payload)?;
    ctx.output.success(&format!("Wrote {}", written.display()));

    if let Some(professional) = &output.professional {
        let payload = pipeline.export(professional, args.format, project).await?;
        let written = write_payload(&out_dir, &payload)?;
        ctx.output.success(&format!(
            "Wrote {} ({}, {})",
            written.display(),
            professional.document_type.title(),
            professional.standard.label()
        ));
    }

    let meta = &output.document.metadata;
    ctx.output.field("Files", meta.file_count);
    ctx.output.field("Components", meta.component_count);
    ctx.output.field("Services", meta.service_count);
    ctx.output.field("Lines", meta.total_lines);
    Ok(())
}
