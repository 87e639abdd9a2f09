//! Init Command
//!
//! Create `.codescribe/config.toml` in the current directory.

use crate::cli::ui::Output;
use crate::cli::util::is_initialized;
use crate::config::ConfigLoader;
use crate::types::{Result, ScribeError};

pub fn run(force: bool, output: &Output) -> Result<()> {
    if is_initialized() && !force {
        return Err(ScribeError::Config(
            "Already initialized. Use --force to overwrite.".to_string(),
        ));
    }

    let root = std::env::current_dir()?;
    let project_name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();

    let config_path = ConfigLoader::init_project(&root, Some(&project_name), force)?;

    // Never overwrite an existing global config from here
    if let Err(e) = ConfigLoader::init_global(false) {
        tracing::debug!("Global config init skipped: {}", e);
    }

    output.success("Initialized codescribe in .codescribe/");
    output.field("Project", &project_name);
    output.field("Config", config_path.display());
    output.section("Next steps");
    output.item("codescribe analyze .     summarize files, symbols and dependencies");
    output.item("codescribe docs .        write documentation to docs/generated");
    output.item("codescribe workflows .   extract workflows and user stories");

    Ok(())
}
