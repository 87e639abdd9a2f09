//! Config Command
//!
//! Usage:
//!   codescribe config show [-g] [-f json]
//!   codescribe config path
//!   codescribe config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show configuration
pub fn show(global: bool, format: &str, output: &Output) -> Result<()> {
    if !global {
        // Merged effective config
        return ConfigLoader::show_config(format == "json");
    }

    match ConfigLoader::global_config_path() {
        Some(global_path) if global_path.exists() => {
            let content = std::fs::read_to_string(&global_path)?;
            println!("# Global Config: {}\n", global_path.display());
            println!("{}", content);
        }
        Some(_) => {
            output.warning("No global config found.");
            output.info("Run 'codescribe config init --global' to create one.");
        }
        None => output.error("Cannot determine global config directory."),
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init_global(force: bool, output: &Output) -> Result<()> {
    let config_path = ConfigLoader::init_global(force)?;
    output.success("Initialized global configuration");
    output.field("Config", config_path.display());
    Ok(())
}

pub fn init_project(force: bool, output: &Output) -> Result<()> {
    let root = std::env::current_dir()?;
    let project_name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string();

    let config_path = ConfigLoader::init_project(&root, Some(&project_name), force)?;
    output.success("Initialized project configuration");
    output.field("Config", config_path.display());
    Ok(())
}
