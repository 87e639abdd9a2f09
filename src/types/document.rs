//! Rendered document types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counts computed from the analysis, never from rendered text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocMetadata {
    pub file_count: usize,
    pub component_count: usize,
    pub service_count: usize,
    pub total_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocSection {
    pub id: String,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDoc {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub ai_optimized: String,
    pub sections: Vec<DocSection>,
    pub metadata: DocMetadata,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedDoc {
    pub fn section(&self, id: &str) -> Option<&DocSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}

// =============================================================================
// Professional Document Options
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    #[default]
    TechnicalSpec,
    ApiReference,
    UserGuide,
    Architecture,
    Onboarding,
    ExecutiveBrief,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::TechnicalSpec,
        DocumentType::ApiReference,
        DocumentType::UserGuide,
        DocumentType::Architecture,
        DocumentType::Onboarding,
        DocumentType::ExecutiveBrief,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DocumentType::TechnicalSpec => "Technical Specification",
            DocumentType::ApiReference => "API Reference",
            DocumentType::UserGuide => "User Guide",
            DocumentType::Architecture => "Architecture Document",
            DocumentType::Onboarding => "Developer Onboarding Guide",
            DocumentType::ExecutiveBrief => "Executive Brief",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "technical-spec" | "technical" | "spec" => Ok(DocumentType::TechnicalSpec),
            "api-reference" | "api" => Ok(DocumentType::ApiReference),
            "user-guide" | "guide" => Ok(DocumentType::UserGuide),
            "architecture" | "arch" => Ok(DocumentType::Architecture),
            "onboarding" => Ok(DocumentType::Onboarding),
            "executive-brief" | "executive" => Ok(DocumentType::ExecutiveBrief),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentationStandard {
    #[default]
    Default,
    Ieee1016,
    Arc42,
    Iso26514,
}

impl DocumentationStandard {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentationStandard::Default => "Standard",
            DocumentationStandard::Ieee1016 => "IEEE 1016 (Software Design Description)",
            DocumentationStandard::Arc42 => "arc42",
            DocumentationStandard::Iso26514 => "ISO/IEC 26514 (User Documentation)",
        }
    }
}

impl std::str::FromStr for DocumentationStandard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' ', '/'], "-").as_str() {
            "default" | "standard" => Ok(DocumentationStandard::Default),
            "ieee1016" | "ieee-1016" => Ok(DocumentationStandard::Ieee1016),
            "arc42" => Ok(DocumentationStandard::Arc42),
            "iso26514" | "iso-26514" | "iso-iec-26514" => Ok(DocumentationStandard::Iso26514),
            other => Err(format!("unknown documentation standard: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplianceFramework {
    #[serde(rename = "SOC2")]
    Soc2,
    #[serde(rename = "GDPR")]
    Gdpr,
    #[serde(rename = "HIPAA")]
    Hipaa,
    #[serde(rename = "ISO27001")]
    Iso27001,
    #[serde(rename = "PCI-DSS")]
    PciDss,
}

impl ComplianceFramework {
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceFramework::Soc2 => "SOC 2",
            ComplianceFramework::Gdpr => "GDPR",
            ComplianceFramework::Hipaa => "HIPAA",
            ComplianceFramework::Iso27001 => "ISO 27001",
            ComplianceFramework::PciDss => "PCI DSS",
        }
    }
}

/// Professional document: the generated document plus the options it was rendered with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalDoc {
    #[serde(flatten)]
    pub doc: GeneratedDoc,
    pub document_type: DocumentType,
    pub standard: DocumentationStandard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_from_str() {
        assert_eq!("api".parse::<DocumentType>(), Ok(DocumentType::ApiReference));
        assert_eq!(
            "executive_brief".parse::<DocumentType>(),
            Ok(DocumentType::ExecutiveBrief)
        );
        assert!("novel".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_standard_from_str() {
        assert_eq!(
            "IEEE 1016".parse::<DocumentationStandard>(),
            Ok(DocumentationStandard::Ieee1016)
        );
        assert_eq!(
            "ISO/IEC 26514".parse::<DocumentationStandard>(),
            Ok(DocumentationStandard::Iso26514)
        );
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let meta = DocMetadata {
            file_count: 2,
            component_count: 1,
            service_count: 0,
            total_lines: 12,
        };
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(json["componentCount"], 1);
        assert_eq!(json["fileCount"], 2);
    }
}
