//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (user config dir) and project (.codescribe/) level configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{extraction, llm, minified, paths};
use crate::types::{
    ComplianceFramework, DocumentType, DocumentationStandard, Result, ScribeError,
};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Project-specific settings
    pub project: ProjectConfig,

    /// File filter settings
    pub filter: FilterConfig,

    /// Code analysis settings
    pub analysis: AnalysisConfig,

    /// Documentation output settings
    pub documentation: DocumentationConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Usage quota settings
    pub usage: UsageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            project: ProjectConfig::default(),
            filter: FilterConfig::default(),
            analysis: AnalysisConfig::default(),
            documentation: DocumentationConfig::default(),
            llm: LlmConfig::default(),
            usage: UsageConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ScribeError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ScribeError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ScribeError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_output_tokens == 0 {
            return Err(ScribeError::Config(
                "LLM max_output_tokens must be greater than 0".to_string(),
            ));
        }

        if let Some(base) = &self.llm.api_base {
            url::Url::parse(base).map_err(|e| {
                ScribeError::Config(format!("LLM api_base is not a valid URL ({}): {}", base, e))
            })?;
        }

        if self.filter.minified.max_lines == 0 {
            return Err(ScribeError::Config(
                "filter.minified.max_lines must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Project Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name (defaults to directory or archive name)
    pub name: Option<String>,
}

// =============================================================================
// Filter Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub include_tests: bool,
    pub include_styles: bool,
    pub include_config: bool,

    /// Path substrings that drop a file
    pub custom_excludes: Vec<String>,

    pub minified: MinifiedConfig,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            include_styles: true,
            include_config: true,
            custom_excludes: Vec::new(),
            minified: MinifiedConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifiedConfig {
    pub max_lines: usize,
    pub min_chars: usize,
    pub max_single_letter_tokens: usize,
}

impl Default for MinifiedConfig {
    fn default() -> Self {
        Self {
            max_lines: minified::MAX_LINES,
            min_chars: minified::MIN_CHARS,
            max_single_letter_tokens: minified::MAX_SINGLE_LETTER_TOKENS,
        }
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Files larger than this are skipped during directory ingestion
    pub max_file_size: u64,

    /// Run the workflow extractor as part of `docs`
    pub extract_workflows: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_file_size: extraction::DEFAULT_MAX_FILE_SIZE,
            extract_workflows: true,
        }
    }
}

// =============================================================================
// Documentation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    pub output_dir: PathBuf,
    pub document_type: DocumentType,
    pub standard: DocumentationStandard,
    pub branding: BrandingConfig,
    pub compliance: ComplianceConfig,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(paths::DEFAULT_OUTPUT_DIR),
            document_type: DocumentType::default(),
            standard: DocumentationStandard::default(),
            branding: BrandingConfig::default(),
            compliance: ComplianceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingConfig {
    pub company_name: Option<String>,
    pub document_owner: Option<String>,
    pub confidentiality: Option<String>,
    pub version_label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    pub frameworks: Vec<ComplianceFramework>,
    pub include_audit_trail: bool,
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (`anthropic` or `openai`)
    pub provider: String,

    /// Model name
    pub model: String,

    /// Override for the provider base URL
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub max_output_tokens: u32,

    /// Temperature for generation (0.0 = deterministic)
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: llm::DEFAULT_PROVIDER.to_string(),
            model: llm::DEFAULT_MODEL.to_string(),
            api_base: None,
            timeout_secs: llm::DEFAULT_TIMEOUT_SECS,
            max_output_tokens: llm::DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: 0.2,
        }
    }
}

// =============================================================================
// Usage Configuration
// =============================================================================

/// Daily limits per action; `None` means unlimited
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    pub analysis_limit: Option<u32>,
    pub export_limit: Option<u32>,
    pub chat_limit: Option<u32>,
}

impl UsageConfig {
    pub fn is_unmetered(&self) -> bool {
        self.analysis_limit.is_none() && self.export_limit.is_none() && self.chat_limit.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "anthropic");
        assert!(!config.filter.include_tests);
        assert!(config.filter.include_styles);
        assert_eq!(config.filter.minified.max_lines, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.api_base = Some("not a url".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.api_base = Some("http://localhost:8080/v1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[filter]
include_tests = true

[documentation]
document_type = "api-reference"
standard = "arc42"

[documentation.compliance]
frameworks = ["GDPR", "SOC2"]
"#,
        )
        .unwrap();
        assert!(config.filter.include_tests);
        assert!(config.filter.include_config);
        assert_eq!(config.documentation.document_type, DocumentType::ApiReference);
        assert_eq!(config.documentation.standard, DocumentationStandard::Arc42);
        assert_eq!(config.documentation.compliance.frameworks.len(), 2);
        assert!(config.usage.is_unmetered());
    }
}
