//! Analyze Command
//!
//! Ingest, filter and analyse a project, then print a summary
//! (or the full analysis as JSON).

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ai::AugmentationStage;
use crate::cli::util::{CommandContext, resolve_input};
use crate::filter::FilterReport;
use crate::types::{ProjectAnalysis, Result, ScribeError};

#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub path: PathBuf,
    pub format: String,
    pub include_tests: bool,
    pub include_styles: bool,
    pub exclude_config: bool,
    pub exclude: Vec<String>,
}

pub async fn run(ctx: &CommandContext, args: AnalyzeArgs) -> Result<()> {
    let as_json = match args.format.as_str() {
        "json" => true,
        "text" => false,
        other => {
            return Err(ScribeError::Config(format!(
                "Invalid format '{}'. Valid values: text, json",
                other
            )));
        }
    };

    let mut options = ctx.pipeline_options();
    options.filter.include_tests |= args.include_tests;
    options.filter.include_styles |= args.include_styles;
    if args.exclude_config {
        options.filter.include_config = false;
    }
    options.filter.custom_excludes.extend(args.exclude);

    let pipeline = ctx.pipeline(AugmentationStage::deterministic(&ctx.config.llm));
    let input = resolve_input(&args.path).await?;
    let (analysis, report) = pipeline.analyze(input, &options).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_summary(ctx, &analysis, &report);
    }
    Ok(())
}

fn print_summary(ctx: &CommandContext, analysis: &ProjectAnalysis, report: &FilterReport) {
    let out = &ctx.output;
    out.header(&format!("Analysis: {}", analysis.name));
    out.field("Type", &analysis.project_type);
    out.field("Files", analysis.files.len());
    out.field("Lines", analysis.total_lines());
    out.field(
        "Dependencies",
        format!(
            "{} runtime, {} dev",
            analysis.dependencies.len(),
            analysis.dev_dependencies.len()
        ),
    );
    if let Some(build_tool) = &analysis.architecture.build_tool {
        out.field("Build tool", build_tool);
    }

    let mut languages: BTreeMap<String, usize> = BTreeMap::new();
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    for file in &analysis.files {
        *languages.entry(file.language.to_string()).or_default() += 1;
        *categories.entry(file.category.to_string()).or_default() += 1;
    }
    print_counts(ctx, "Languages", languages);
    print_counts(ctx, "Categories", categories);

    if !analysis.architecture.patterns.is_empty() {
        out.section("Patterns");
        for pattern in &analysis.architecture.patterns {
            out.item(pattern);
        }
    }
    if !analysis.architecture.technologies.is_empty() {
        out.section("Technologies");
        out.item(&analysis.architecture.technologies.join(", "));
    }
    if !analysis.entry_points.is_empty() {
        out.section("Entry points");
        for entry in &analysis.entry_points {
            out.item(entry);
        }
    }

    out.section("Filtering");
    out.field("Kept", report.kept_files);
    out.field(
        "Ignored",
        format!("{} files, {} directories", report.ignored_files, report.ignored_dirs),
    );
    for (reason, count) in &report.reasons {
        out.item(&format!("{}: {}", reason.as_str(), count));
    }
}

fn print_counts(ctx: &CommandContext, title: &str, counts: BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ctx.output.section(title);
    for (name, count) in sorted {
        ctx.output.item(&format!("{}: {} files", name, count));
    }
}
