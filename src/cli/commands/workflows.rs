//! Workflows Command
//!
//! Extract workflow signals, generate workflows and user stories through
//! the configured model (or the deterministic generator), and write both
//! as markdown.

use std::path::PathBuf;

use crate::ai::AugmentationStage;
use crate::cli::util::{CommandContext, resolve_input, write_payload, write_text};
use crate::docs::{ExportFormat, render_workflow_analysis};
use crate::types::Result;

#[derive(Debug, Clone)]
pub struct WorkflowsArgs {
    pub path: PathBuf,
    pub output: Option<PathBuf>,
    pub no_ai: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
}

pub async fn run(ctx: &CommandContext, args: WorkflowsArgs) -> Result<()> {
    let mut llm = ctx.config.llm.clone();
    if let Some(provider) = args.provider {
        llm.provider = provider;
    }
    if let Some(model) = args.model {
        llm.model = model;
    }

    let augmentation = if args.no_ai {
        AugmentationStage::deterministic(&llm)
    } else {
        AugmentationStage::from_config(&llm)
    };
    if !args.no_ai && !augmentation.has_provider() {
        ctx.output
            .warning("No API key configured for the LLM provider; using deterministic generation");
    }

    let mut options = ctx.pipeline_options();
    options.extract_workflows = true;
    options.generate_stories = true;

    let pipeline = ctx.pipeline(augmentation);
    let input = resolve_input(&args.path).await?;
    let output = pipeline.run(input, &options).await?;
    let out_dir = ctx.output_dir(args.output);

    if let Some(data) = &output.workflow_data {
        let written = write_text(&out_dir, "workflow-analysis.md", &render_workflow_analysis(data))?;
        ctx.output.success(&format!("Wrote {}", written.display()));
    }

    let Some(generation) = &output.generation else {
        return Ok(());
    };
    let payload = pipeline
        .export(&generation.result, ExportFormat::Markdown, &output.analysis.name)
        .await?;
    let written = write_payload(&out_dir, &payload)?;
    ctx.output.success(&format!("Wrote {}", written.display()));

    ctx.output.field("Source", &generation.source);
    ctx.output.field("Workflows", generation.result.workflows.len());
    ctx.output.field("User stories", generation.result.user_stories.len());
    ctx.output.field("Capabilities", generation.result.capabilities.len());
    if let Some(usage) = generation.usage {
        ctx.output.field(
            "Tokens",
            format!("{} in, {} out", usage.input_tokens, usage.output_tokens),
        );
    }
    Ok(())
}
