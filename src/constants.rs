//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// Project/config directory names
pub mod paths {
    /// Project-local configuration directory
    pub const PROJECT_DIR: &str = ".codescribe";

    /// Configuration file name (both global and project)
    pub const CONFIG_FILE: &str = "config.toml";

    /// Environment variable prefix for configuration overrides
    pub const ENV_PREFIX: &str = "CODESCRIBE_";

    /// Default output directory for generated documents
    pub const DEFAULT_OUTPUT_DIR: &str = "docs/generated";
}

/// Minified-source heuristic defaults
pub mod minified {
    /// Files shorter than this many lines...
    pub const MAX_LINES: usize = 10;

    /// ...and longer than this many characters are treated as minified
    pub const MIN_CHARS: usize = 1000;

    /// More single-letter identifier tokens than this marks a file minified
    pub const MAX_SINGLE_LETTER_TOKENS: usize = 50;
}

/// Complexity scoring
pub mod complexity {
    pub const LINE_WEIGHT: f64 = 0.1;
    pub const FUNCTION_WEIGHT: f64 = 2.0;
    pub const BRANCH_WEIGHT: f64 = 1.5;

    /// Scores below this are `low`
    pub const LOW_THRESHOLD: f64 = 20.0;

    /// Scores below this (and not low) are `medium`
    pub const MEDIUM_THRESHOLD: f64 = 50.0;
}

/// Extraction caps
pub mod extraction {
    /// Maximum characters kept from a route handler body
    pub const HANDLER_EXCERPT_CHARS: usize = 200;

    /// Maximum entries per business-logic inventory list, per file
    pub const BUSINESS_LOGIC_CAP: usize = 25;

    /// Default per-file size limit for directory ingestion (bytes)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;
}

/// Model prompt sizing
pub mod prompt {
    /// Token budget for serialized signals inside the workflow prompt
    pub const SIGNAL_TOKEN_BUDGET: usize = 12_000;

    /// Maximum routes listed in the prompt
    pub const MAX_ROUTES: usize = 60;

    /// Maximum data operations listed in the prompt
    pub const MAX_DATA_OPERATIONS: usize = 60;

    /// Maximum UI interaction records listed in the prompt
    pub const MAX_UI_RECORDS: usize = 40;

    /// Maximum business-logic records listed in the prompt
    pub const MAX_BUSINESS_RECORDS: usize = 40;
}

/// LLM defaults
pub mod llm {
    pub const DEFAULT_PROVIDER: &str = "anthropic";
    pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
    pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8192;

    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
}
