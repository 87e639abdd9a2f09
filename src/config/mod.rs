//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (<user config dir>/codescribe/config.toml)
//! 3. Project config (.codescribe/config.toml)
//! 4. Environment variables (CODESCRIBE_*)
//! 5. CLI arguments (highest priority)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;
