use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codescribe::cli::commands::{analyze, config, docs, init, workflows};
use codescribe::cli::{CommandContext, Output};
use codescribe::docs::ExportFormat;
use codescribe::types::{DocumentType, DocumentationStandard};

/// Parse export format from string
fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>()
        .map_err(|e| format!("{}. Valid values: markdown, text, ai, json, yaml", e))
}

/// Parse document type from string
fn parse_document_type(s: &str) -> Result<DocumentType, String> {
    s.parse::<DocumentType>().map_err(|e| {
        format!(
            "{}. Valid values: technical-spec, api-reference, user-guide, architecture, onboarding, executive-brief",
            e
        )
    })
}

/// Parse documentation standard from string
fn parse_standard(s: &str) -> Result<DocumentationStandard, String> {
    s.parse::<DocumentationStandard>()
        .map_err(|e| format!("{}. Valid values: default, ieee1016, arc42, iso26514", e))
}

#[derive(Parser)]
#[command(name = "codescribe")]
#[command(version, about = "Documentation generator for source projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize codescribe in the current directory
    Init {
        #[arg(long, short, help = "Overwrite existing configuration")]
        force: bool,
    },

    /// Analyze a project and print a summary
    Analyze {
        #[arg(help = "Project directory or .zip archive")]
        path: PathBuf,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
        #[arg(long, help = "Keep test files")]
        include_tests: bool,
        #[arg(long, help = "Keep stylesheets")]
        include_styles: bool,
        #[arg(long, help = "Drop configuration files")]
        exclude_config: bool,
        #[arg(long, value_name = "SUBSTR", help = "Drop paths containing this substring")]
        exclude: Vec<String>,
    },

    /// Generate documentation
    Docs {
        #[arg(help = "Project directory or .zip archive")]
        path: PathBuf,
        #[arg(short, long, help = "Output directory")]
        output: Option<PathBuf>,
        #[arg(long, help = "Also write a professional document")]
        professional: bool,
        #[arg(long, value_parser = parse_document_type, help = "Professional document type")]
        doc_type: Option<DocumentType>,
        #[arg(long, value_parser = parse_standard, help = "Documentation standard")]
        standard: Option<DocumentationStandard>,
        #[arg(
            short = 'f',
            long,
            default_value = "markdown",
            value_parser = parse_export_format,
            help = "Export format: markdown, text, ai, json, yaml"
        )]
        format: ExportFormat,
    },

    /// Extract workflows and user stories
    Workflows {
        #[arg(help = "Project directory or .zip archive")]
        path: PathBuf,
        #[arg(short, long, help = "Output directory")]
        output: Option<PathBuf>,
        #[arg(long, help = "Skip the LLM and use deterministic generation")]
        no_ai: bool,
        #[arg(long, help = "LLM provider: anthropic, openai")]
        provider: Option<String>,
        #[arg(long, help = "Model name")]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mcodescribe encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Output::new().error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let output = Output::quiet(cli.quiet);

    match cli.command {
        Commands::Init { force } => {
            init::run(force, &output)?;
        }
        Commands::Analyze {
            path,
            format,
            include_tests,
            include_styles,
            exclude_config,
            exclude,
        } => {
            let ctx = CommandContext::load(cli.quiet)?;
            let rt = Runtime::new()?;
            rt.block_on(analyze::run(
                &ctx,
                analyze::AnalyzeArgs {
                    path,
                    format,
                    include_tests,
                    include_styles,
                    exclude_config,
                    exclude,
                },
            ))?;
        }
        Commands::Docs {
            path,
            output: out_dir,
            professional,
            doc_type,
            standard,
            format,
        } => {
            let ctx = CommandContext::load(cli.quiet)?;
            let rt = Runtime::new()?;
            rt.block_on(docs::run(
                &ctx,
                docs::DocsArgs {
                    path,
                    output: out_dir,
                    professional,
                    doc_type,
                    standard,
                    format,
                },
            ))?;
        }
        Commands::Workflows {
            path,
            output: out_dir,
            no_ai,
            provider,
            model,
        } => {
            let ctx = CommandContext::load(cli.quiet)?;
            let rt = Runtime::new()?;
            rt.block_on(workflows::run(
                &ctx,
                workflows::WorkflowsArgs {
                    path,
                    output: out_dir,
                    no_ai,
                    provider,
                    model,
                },
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                config::show(global, &format, &output)?;
            }
            ConfigAction::Path => {
                config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    config::init_global(force, &output)?;
                } else {
                    config::init_project(force, &output)?;
                }
            }
        },
    }

    Ok(())
}
