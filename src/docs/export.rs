//! Document export to downloadable payloads

use serde::Serialize;

use crate::types::{GeneratedDoc, ProfessionalDoc, Result, ScribeError, WorkflowGenerationResult};

use super::workflow_doc::render_workflow_result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Markdown,
    Text,
    AiOptimized,
    Json,
    Yaml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Text => "txt",
            ExportFormat::AiOptimized => "ai.txt",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Text | ExportFormat::AiOptimized => "text/plain; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Yaml => "application/yaml",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Text => "text",
            ExportFormat::AiOptimized => "ai",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "text" | "txt" | "plain" => Ok(ExportFormat::Text),
            "ai" | "ai-optimized" => Ok(ExportFormat::AiOptimized),
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            other => Err(format!("unknown export format: {}", other)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Bytes ready for download or writing to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// Anything that can be exported
pub trait Exportable: Serialize {
    /// Base name for the exported file, without extension
    fn file_stem(&self) -> String;

    fn markdown(&self) -> String;

    /// Dense variant; plain markdown when the type has none
    fn ai_optimized(&self) -> Option<&str> {
        None
    }
}

impl Exportable for GeneratedDoc {
    fn file_stem(&self) -> String {
        slugify(&self.title)
    }

    fn markdown(&self) -> String {
        self.content.clone()
    }

    fn ai_optimized(&self) -> Option<&str> {
        Some(&self.ai_optimized)
    }
}

impl Exportable for ProfessionalDoc {
    fn file_stem(&self) -> String {
        self.doc.file_stem()
    }

    fn markdown(&self) -> String {
        self.doc.content.clone()
    }

    fn ai_optimized(&self) -> Option<&str> {
        Some(&self.doc.ai_optimized)
    }
}

impl Exportable for WorkflowGenerationResult {
    fn file_stem(&self) -> String {
        "workflows".to_string()
    }

    fn markdown(&self) -> String {
        render_workflow_result(self)
    }
}

pub fn export(item: &impl Exportable, format: ExportFormat) -> Result<ExportPayload> {
    let text = match format {
        ExportFormat::Markdown => item.markdown(),
        ExportFormat::Text => markdown_to_text(&item.markdown()),
        ExportFormat::AiOptimized => item
            .ai_optimized()
            .map(str::to_string)
            .unwrap_or_else(|| item.markdown()),
        ExportFormat::Json => serde_json::to_string_pretty(item).map_err(|e| export_error(format, e))?,
        ExportFormat::Yaml => serde_yaml::to_string(item).map_err(|e| export_error(format, e))?,
    };

    Ok(ExportPayload {
        bytes: text.into_bytes(),
        file_name: format!("{}.{}", item.file_stem(), format.extension()),
        mime_type: format.mime_type(),
    })
}

fn export_error(format: ExportFormat, err: impl std::fmt::Display) -> ScribeError {
    ScribeError::Export {
        format: format.to_string(),
        message: err.to_string(),
    }
}

/// Lower-case, dash-separated file stem
fn slugify(title: &str) -> String {
    let slug = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() { "document".to_string() } else { slug }
}

/// Strip markdown markup, keeping the words
pub fn markdown_to_text(markdown: &str) -> String {
    let mut output = String::new();
    for line in markdown.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("|---") || trimmed == "---" {
            continue;
        }
        let mut text = trimmed.trim_start_matches('#').trim_start().to_string();
        if text.starts_with('|') {
            text = text
                .trim_matches('|')
                .split('|')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
                .join("  ");
        }
        let text = text.replace("**", "").replace('`', "");
        let indent = &line[..line.len() - trimmed.len()];
        output.push_str(indent);
        output.push_str(&text);
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_project;
    use crate::docs::generate_standard;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};

    fn doc() -> GeneratedDoc {
        let mut root = ingest_files(
            "My App",
            vec![
                RawFile::new("package.json", br#"{"dependencies":{"react":"^18.2.0"}}"#.to_vec()),
                RawFile::new("App.tsx", b"export default function App() {\n  return <div/>;\n}\n".to_vec()),
            ],
        );
        apply_filters(&mut root, &FilterOptions::default());
        generate_standard(&analyze_project(&root, "My App"))
    }

    #[test]
    fn test_markdown_and_text() {
        let doc = doc();
        let md = export(&doc, ExportFormat::Markdown).unwrap();
        assert_eq!(md.file_name, "my-app-documentation.md");
        assert_eq!(md.bytes, doc.content.as_bytes());

        let text = String::from_utf8(export(&doc, ExportFormat::Text).unwrap().bytes).unwrap();
        assert!(text.starts_with("My App Documentation\n"));
        assert!(!text.contains("**"));
        assert!(!text.contains("```"));
    }

    #[test]
    fn test_structured_formats() {
        let doc = doc();
        let json = export(&doc, ExportFormat::Json).unwrap();
        assert_eq!(json.mime_type, "application/json");
        let value: serde_json::Value = serde_json::from_slice(&json.bytes).unwrap();
        assert_eq!(value["metadata"]["componentCount"], 1);

        let yaml = export(&doc, ExportFormat::Yaml).unwrap();
        let back: GeneratedDoc = serde_yaml::from_slice(&yaml.bytes).unwrap();
        assert_eq!(back.metadata, doc.metadata);

        let ai = export(&doc, ExportFormat::AiOptimized).unwrap();
        assert_eq!(ai.file_name, "my-app-documentation.ai.txt");
        assert!(String::from_utf8(ai.bytes).unwrap().starts_with("PROJECT My App"));
    }

    #[test]
    fn test_workflow_result_falls_back_to_markdown() {
        let result = WorkflowGenerationResult::default();
        let payload = export(&result, ExportFormat::AiOptimized).unwrap();
        assert_eq!(payload.file_name, "workflows.ai.txt");
        assert!(String::from_utf8(payload.bytes).unwrap().starts_with("# Workflows"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("MD".parse::<ExportFormat>(), Ok(ExportFormat::Markdown));
        assert_eq!("yml".parse::<ExportFormat>(), Ok(ExportFormat::Yaml));
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
