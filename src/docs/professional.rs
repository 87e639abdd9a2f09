//! Professional Document Generator
//!
//! Documents are assembled from a section registry: each entry is a pure
//! renderer `(analysis, config) -> markdown`, and a `DocumentType` is just
//! an ordered list of section ids. The `DocumentationStandard` decides how
//! sections are titled and numbered, branding and compliance options add
//! front matter and appendices.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::{BrandingConfig, ComplianceConfig, DocumentationConfig};
use crate::types::{
    CommentKind, Complexity, ComplianceFramework, DocMetadata, DocSection, DocumentType, DocumentationStandard,
    FileCategory, GeneratedDoc, ProfessionalDoc, ProjectAnalysis, SymbolKind,
};

use super::ai_optimized::generate_ai_optimized;
use super::standard::{category_breakdown, dependency_list, install_commands, render_tree};

const MAX_API_ENTRIES: usize = 40;
const MAX_MODULE_ROWS: usize = 60;
const MAX_RISK_ITEMS: usize = 10;

/// Options for one professional rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfessionalConfig {
    pub document_type: DocumentType,
    pub standard: DocumentationStandard,
    pub branding: BrandingConfig,
    pub compliance: ComplianceConfig,
}

impl From<&DocumentationConfig> for ProfessionalConfig {
    fn from(config: &DocumentationConfig) -> Self {
        Self {
            document_type: config.document_type,
            standard: config.standard,
            branding: config.branding.clone(),
            compliance: config.compliance.clone(),
        }
    }
}

// =============================================================================
// Section Registry
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionId {
    ExecutiveSummary,
    SystemOverview,
    ArchitectureOverview,
    TechnologyStack,
    ComponentCatalog,
    ApiOverview,
    DataModel,
    ModuleReference,
    ProjectStructure,
    Dependencies,
    QuickStart,
    DevelopmentWorkflow,
    Configuration,
    QualityAttributes,
    Risks,
    Glossary,
}

type SectionRenderer = fn(&ProjectAnalysis, &ProfessionalConfig) -> String;

struct SectionDef {
    id: SectionId,
    slug: &'static str,
    title: &'static str,
    /// Chapter name under arc42
    arc42: &'static str,
    /// View name under IEEE 1016
    ieee: &'static str,
    render: SectionRenderer,
}

const SECTION_REGISTRY: &[SectionDef] = &[
    SectionDef {
        id: SectionId::ExecutiveSummary,
        slug: "executive-summary",
        title: "Executive Summary",
        arc42: "Introduction and Goals",
        ieee: "Introduction",
        render: executive_summary,
    },
    SectionDef {
        id: SectionId::SystemOverview,
        slug: "system-overview",
        title: "System Overview",
        arc42: "Context and Scope",
        ieee: "Context Viewpoint",
        render: system_overview,
    },
    SectionDef {
        id: SectionId::ArchitectureOverview,
        slug: "architecture-overview",
        title: "Architecture Overview",
        arc42: "Solution Strategy",
        ieee: "Structure Viewpoint",
        render: architecture_overview,
    },
    SectionDef {
        id: SectionId::TechnologyStack,
        slug: "technology-stack",
        title: "Technology Stack",
        arc42: "Architecture Constraints",
        ieee: "Design Rationale",
        render: technology_stack,
    },
    SectionDef {
        id: SectionId::ComponentCatalog,
        slug: "component-catalog",
        title: "Component Catalog",
        arc42: "Building Block View",
        ieee: "Composition Viewpoint",
        render: component_catalog,
    },
    SectionDef {
        id: SectionId::ApiOverview,
        slug: "api-overview",
        title: "API Overview",
        arc42: "Runtime View",
        ieee: "Interface Viewpoint",
        render: api_overview,
    },
    SectionDef {
        id: SectionId::DataModel,
        slug: "data-model",
        title: "Data Model",
        arc42: "Crosscutting Concepts",
        ieee: "Information Viewpoint",
        render: data_model,
    },
    SectionDef {
        id: SectionId::ModuleReference,
        slug: "module-reference",
        title: "Module Reference",
        arc42: "Building Block View (Level 2)",
        ieee: "Logical Viewpoint",
        render: module_reference,
    },
    SectionDef {
        id: SectionId::ProjectStructure,
        slug: "project-structure",
        title: "Project Structure",
        arc42: "Deployment View",
        ieee: "Physical Viewpoint",
        render: project_structure,
    },
    SectionDef {
        id: SectionId::Dependencies,
        slug: "dependencies",
        title: "Dependencies",
        arc42: "Technical Context",
        ieee: "Dependency Viewpoint",
        render: dependencies,
    },
    SectionDef {
        id: SectionId::QuickStart,
        slug: "quick-start",
        title: "Quick Start",
        arc42: "Deployment Instructions",
        ieee: "Deployment Viewpoint",
        render: quick_start,
    },
    SectionDef {
        id: SectionId::DevelopmentWorkflow,
        slug: "development-workflow",
        title: "Development Workflow",
        arc42: "Development Concepts",
        ieee: "Algorithm Viewpoint",
        render: development_workflow,
    },
    SectionDef {
        id: SectionId::Configuration,
        slug: "configuration",
        title: "Configuration",
        arc42: "Configuration Concepts",
        ieee: "Resource Viewpoint",
        render: configuration,
    },
    SectionDef {
        id: SectionId::QualityAttributes,
        slug: "quality-attributes",
        title: "Quality Attributes",
        arc42: "Quality Requirements",
        ieee: "Quality Considerations",
        render: quality_attributes,
    },
    SectionDef {
        id: SectionId::Risks,
        slug: "risks",
        title: "Risks and Technical Debt",
        arc42: "Risks and Technical Debt",
        ieee: "Design Issues",
        render: risks,
    },
    SectionDef {
        id: SectionId::Glossary,
        slug: "glossary",
        title: "Glossary",
        arc42: "Glossary",
        ieee: "Definitions",
        render: glossary,
    },
];

fn section_def(id: SectionId) -> Option<&'static SectionDef> {
    SECTION_REGISTRY.iter().find(|def| def.id == id)
}

/// Ordered section ids for a document type
pub fn sections_for(document_type: DocumentType) -> &'static [SectionId] {
    use SectionId::*;
    match document_type {
        DocumentType::TechnicalSpec => &[
            SystemOverview,
            ArchitectureOverview,
            TechnologyStack,
            ModuleReference,
            DataModel,
            ApiOverview,
            Dependencies,
            QualityAttributes,
        ],
        DocumentType::ApiReference => &[SystemOverview, ApiOverview, DataModel, ModuleReference],
        DocumentType::UserGuide => &[SystemOverview, QuickStart, ComponentCatalog, Configuration, Glossary],
        DocumentType::Architecture => &[
            SystemOverview,
            ArchitectureOverview,
            TechnologyStack,
            ProjectStructure,
            ComponentCatalog,
            DataModel,
            QualityAttributes,
            Risks,
        ],
        DocumentType::Onboarding => &[
            SystemOverview,
            QuickStart,
            ProjectStructure,
            DevelopmentWorkflow,
            ComponentCatalog,
            Configuration,
            Glossary,
        ],
        DocumentType::ExecutiveBrief => &[ExecutiveSummary, TechnologyStack, QualityAttributes, Risks],
    }
}

// =============================================================================
// Generation
// =============================================================================

pub fn generate_professional(analysis: &ProjectAnalysis, config: &ProfessionalConfig) -> ProfessionalDoc {
    let mut sections: Vec<DocSection> = sections_for(config.document_type)
        .iter()
        .filter_map(|id| section_def(*id))
        .enumerate()
        .map(|(idx, def)| DocSection {
            id: def.slug.to_string(),
            title: section_title(def, config.standard, idx + 1),
            content: (def.render)(analysis, config),
        })
        .collect();

    if !config.compliance.frameworks.is_empty() {
        sections.push(DocSection {
            id: "compliance".to_string(),
            title: "Appendix A: Compliance Considerations".to_string(),
            content: compliance_appendix(analysis, &config.compliance),
        });
    }

    let title = format!("{} {}", analysis.name, config.document_type.title());
    let generated_at = Utc::now();
    let id = Uuid::new_v4();

    let mut content = format!("# {}\n\n", title);
    content.push_str(&front_matter(&config.branding, config.standard, config.document_type));
    content.push_str(&standard_preface(config.standard));
    for section in &sections {
        content.push_str(&format!("## {}\n\n{}\n", section.title, section.content));
    }
    if config.compliance.include_audit_trail {
        content.push_str("## Document History\n\n");
        content.push_str("| Document ID | Generated | Generator |\n|---|---|---|\n");
        content.push_str(&format!(
            "| {} | {} | codescribe {} |\n\n",
            id,
            generated_at.format("%Y-%m-%d %H:%M UTC"),
            env!("CARGO_PKG_VERSION")
        ));
    }
    content.push_str(&footer(&config.branding));

    info!(
        "Generated {} ({}) for {} with {} sections",
        config.document_type.title(),
        config.standard.label(),
        analysis.name,
        sections.len()
    );

    ProfessionalDoc {
        doc: GeneratedDoc {
            id,
            title,
            content,
            ai_optimized: generate_ai_optimized(analysis),
            sections,
            metadata: DocMetadata::from_analysis(analysis),
            generated_at,
        },
        document_type: config.document_type,
        standard: config.standard,
    }
}

fn section_title(def: &SectionDef, standard: DocumentationStandard, number: usize) -> String {
    match standard {
        DocumentationStandard::Default => def.title.to_string(),
        DocumentationStandard::Ieee1016 => format!("{}. {}", number, def.ieee),
        DocumentationStandard::Arc42 => format!("{}. {}", number, def.arc42),
        DocumentationStandard::Iso26514 => format!("{}. {}", number, def.title),
    }
}

fn front_matter(branding: &BrandingConfig, standard: DocumentationStandard, document_type: DocumentType) -> String {
    let mut rows = Vec::new();
    if let Some(company) = &branding.company_name {
        rows.push(("Organization", company.clone()));
    }
    if let Some(owner) = &branding.document_owner {
        rows.push(("Owner", owner.clone()));
    }
    if let Some(version) = &branding.version_label {
        rows.push(("Version", version.clone()));
    }
    if let Some(level) = &branding.confidentiality {
        rows.push(("Classification", level.clone()));
    }
    if standard != DocumentationStandard::Default {
        rows.push(("Standard", standard.label().to_string()));
        rows.push(("Document type", document_type.title().to_string()));
    }
    if rows.is_empty() {
        return String::new();
    }

    let mut output = String::from("| | |\n|---|---|\n");
    for (key, value) in rows {
        output.push_str(&format!("| **{}** | {} |\n", key, value));
    }
    output.push('\n');
    output
}

fn standard_preface(standard: DocumentationStandard) -> String {
    match standard {
        DocumentationStandard::Default => String::new(),
        DocumentationStandard::Ieee1016 => "This software design description is organized by design viewpoint. \
             Each section presents one view of the system as recovered from its source.\n\n"
            .to_string(),
        DocumentationStandard::Arc42 => {
            "Sections follow the arc42 template; chapters without recoverable content are omitted.\n\n".to_string()
        }
        DocumentationStandard::Iso26514 => "**Audience:** developers and operators of this system. \
             **Conventions:** code identifiers are shown in `monospace`; paths are relative to the project root.\n\n"
            .to_string(),
    }
}

fn footer(branding: &BrandingConfig) -> String {
    let mut parts = Vec::new();
    if let Some(level) = &branding.confidentiality {
        parts.push(level.clone());
    }
    if let Some(company) = &branding.company_name {
        parts.push(format!("© {}", company));
    }
    if parts.is_empty() {
        return String::new();
    }
    format!("---\n{}\n", parts.join(" · "))
}

// =============================================================================
// Section Renderers
// =============================================================================

fn executive_summary(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let metadata = DocMetadata::from_analysis(analysis);
    let mut output = String::new();
    output.push_str(&format!(
        "**{}** is a {} project of {} files and roughly {} lines of code.",
        analysis.name, analysis.project_type, metadata.file_count, metadata.total_lines
    ));
    if let Some(description) = analysis.description() {
        output.push_str(&format!(" {}", description));
    }
    output.push_str("\n\n");

    output.push_str("| Indicator | Value |\n|---|---|\n");
    output.push_str(&format!("| UI component files | {} |\n", metadata.component_count));
    output.push_str(&format!("| Service files | {} |\n", metadata.service_count));
    output.push_str(&format!(
        "| Runtime dependencies | {} |\n",
        analysis.dependencies.len()
    ));
    output.push_str(&format!(
        "| High-complexity files | {} |\n",
        analysis.files.iter().filter(|f| f.complexity == Complexity::High).count()
    ));
    if !analysis.architecture.technologies.is_empty() {
        output.push_str(&format!(
            "\nKey technologies: {}.\n",
            analysis.architecture.technologies.join(", ")
        ));
    }
    output
}

fn system_overview(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut output = String::new();
    match analysis.description() {
        Some(description) => output.push_str(&format!("{}\n\n", description)),
        None => output.push_str(&format!("{} is a {} project.\n\n", analysis.name, analysis.project_type)),
    }
    if analysis.entry_points.is_empty() {
        output.push_str("No entry points were identified.\n");
    } else {
        output.push_str("Entry points:\n\n");
        for entry in &analysis.entry_points {
            output.push_str(&format!("- `{}`\n", entry));
        }
    }
    if !analysis.architecture.patterns.is_empty() {
        output.push_str(&format!(
            "\nThe codebase follows these patterns: {}.\n",
            analysis.architecture.patterns.join(", ")
        ));
    }
    output
}

fn architecture_overview(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut output = String::new();
    let breakdown = category_breakdown(analysis);
    let has = |category: FileCategory| breakdown.iter().any(|(c, _)| *c == category);

    output.push_str("```mermaid\ngraph TD\n");
    output.push_str("    User([User])\n");
    let mut previous = "User";
    for (category, node, label) in [
        (FileCategory::Component, "UI", "UI Components"),
        (FileCategory::Service, "SVC", "Services"),
        (FileCategory::Utility, "UTIL", "Utilities"),
    ] {
        if has(category) {
            output.push_str(&format!("    {}[{}]\n", node, label));
            output.push_str(&format!("    {} --> {}\n", previous, node));
            previous = node;
        }
    }
    if !analysis.dependencies.is_empty() {
        output.push_str("    EXT[(External Libraries)]\n");
        output.push_str(&format!("    {} --> EXT\n", previous));
    }
    output.push_str("```\n\n");

    if let Some(tool) = &analysis.architecture.build_tool {
        output.push_str(&format!("The project is built with {}.\n\n", tool));
    }
    for pattern in &analysis.architecture.patterns {
        output.push_str(&format!("- {}\n", pattern));
    }
    output
}

fn technology_stack(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    if analysis.architecture.technologies.is_empty() {
        return "No technologies were detected.\n".to_string();
    }
    let mut output = String::new();
    for technology in &analysis.architecture.technologies {
        let described = analysis
            .dependencies
            .iter()
            .find(|d| &d.name == technology)
            .and_then(|d| d.description.as_deref());
        match described {
            Some(description) => output.push_str(&format!("- **{}**: {}\n", technology, description)),
            None => output.push_str(&format!("- **{}**\n", technology)),
        }
    }
    output
}

fn component_catalog(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut output = String::new();
    for file in analysis.files.iter() {
        for component in file.components() {
            output.push_str(&format!("### {}\n\n", component.name));
            output.push_str(&format!("- Source: `{}` (line {})\n", file.path, component.line));
            if let Some(props) = component.params.first() {
                output.push_str(&format!("- Props: `{}`\n", props));
            }
            if let Some(description) = &component.description {
                output.push_str(&format!("- {}\n", description));
            }
            output.push('\n');
        }
    }
    if output.is_empty() {
        output.push_str("No UI components were detected.\n");
    }
    output
}

fn api_overview(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut entries = Vec::new();
    for file in analysis
        .files
        .iter()
        .filter(|f| matches!(f.category, FileCategory::Service | FileCategory::Utility))
    {
        for function in file.functions.iter().filter(|f| f.is_exported && !f.is_component) {
            let prefix = if function.is_async { "async " } else { "" };
            entries.push(format!("- `{}{}` in `{}`", prefix, function.signature(), file.path));
        }
        for class in file.classes.iter().filter(|c| c.symbol.is_exported) {
            for method in class.methods.iter().filter(|m| m.kind == SymbolKind::Method) {
                entries.push(format!("- `{}.{}` in `{}`", class.symbol.name, method.signature(), file.path));
            }
        }
    }
    if entries.is_empty() {
        return "No exported service or utility functions were found.\n".to_string();
    }
    let total = entries.len();
    let mut output: String = entries
        .into_iter()
        .take(MAX_API_ENTRIES)
        .map(|e| e + "\n")
        .collect();
    if total > MAX_API_ENTRIES {
        output.push_str(&format!("- ... and {} more\n", total - MAX_API_ENTRIES));
    }
    output
}

fn data_model(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut output = String::new();
    for file in &analysis.files {
        for interface in &file.interfaces {
            let members: Vec<&str> = interface.members.iter().map(|m| m.name.as_str()).collect();
            output.push_str(&format!(
                "- **{}** (`{}`): {}\n",
                interface.symbol.name,
                file.path,
                if members.is_empty() { "no members".to_string() } else { members.join(", ") }
            ));
        }
        for class in file.classes.iter().filter(|c| !c.properties.is_empty()) {
            let fields: Vec<&str> = class.properties.iter().map(|p| p.name.as_str()).collect();
            output.push_str(&format!(
                "- **{}** class (`{}`): {}\n",
                class.symbol.name,
                file.path,
                fields.join(", ")
            ));
        }
    }
    if output.is_empty() {
        output.push_str("No type declarations were found.\n");
    }
    output
}

fn module_reference(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let rows: Vec<_> = analysis.files.iter().filter(|f| f.has_symbols()).collect();
    if rows.is_empty() {
        return "No modules declare functions, classes or interfaces.\n".to_string();
    }
    let mut output = String::from("| Module | Category | Complexity | Functions | Classes |\n|---|---|---|---|---|\n");
    for file in rows.iter().take(MAX_MODULE_ROWS) {
        output.push_str(&format!(
            "| `{}` | {} | {} | {} | {} |\n",
            file.path,
            file.category,
            file.complexity,
            file.functions.len(),
            file.classes.len()
        ));
    }
    if rows.len() > MAX_MODULE_ROWS {
        output.push_str(&format!("\n{} more modules omitted.\n", rows.len() - MAX_MODULE_ROWS));
    }
    output
}

fn project_structure(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let tree = render_tree(&analysis.structure, 3, 80);
    if tree.is_empty() {
        return "The project contains no documented files.\n".to_string();
    }
    format!("```\n{}```\n", tree)
}

fn dependencies(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let all: Vec<_> = analysis
        .dependencies
        .iter()
        .chain(&analysis.dev_dependencies)
        .cloned()
        .collect();
    if all.is_empty() {
        return "No dependencies were declared.\n".to_string();
    }
    dependency_list(&all)
}

fn quick_start(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let Some(manifest) = &analysis.manifest else {
        return "No manifest was found; setup steps could not be derived.\n".to_string();
    };
    let mut output = String::from("1. Install dependencies and start the project:\n\n```bash\n");
    for command in install_commands(manifest.kind) {
        output.push_str(&format!("{}\n", command));
    }
    output.push_str("```\n");
    if let Some(entry) = analysis.entry_points.first() {
        output.push_str(&format!("\n2. Start reading at `{}`.\n", entry));
    }
    output
}

fn development_workflow(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut output = String::new();
    if let Some(manifest) = &analysis.manifest
        && !manifest.scripts.is_empty()
    {
        output.push_str("| Script | Command |\n|---|---|\n");
        for (name, body) in &manifest.scripts {
            output.push_str(&format!("| `{}` | `{}` |\n", name, body));
        }
        output.push('\n');
    }
    let tooling: Vec<&str> = analysis
        .dev_dependencies
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    if !tooling.is_empty() {
        output.push_str(&format!("Development tooling: {}.\n\n", tooling.join(", ")));
    }
    let markers = analysis
        .files
        .iter()
        .flat_map(|f| &f.comments)
        .filter(|c| c.kind == CommentKind::Marker)
        .count();
    output.push_str(&format!("Open code markers (TODO/FIXME/HACK/NOTE): {}\n", markers));
    output
}

fn configuration(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let files: Vec<_> = analysis.files_in(FileCategory::Config).collect();
    if files.is_empty() {
        return "No configuration files were found.\n".to_string();
    }
    let mut output = String::new();
    for file in files {
        output.push_str(&format!("- `{}`\n", file.path));
    }
    output
}

fn quality_attributes(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let count = |level: Complexity| analysis.files.iter().filter(|f| f.complexity == level).count();
    let mut output = String::from("| Complexity | Files |\n|---|---|\n");
    output.push_str(&format!("| Low | {} |\n", count(Complexity::Low)));
    output.push_str(&format!("| Medium | {} |\n", count(Complexity::Medium)));
    output.push_str(&format!("| High | {} |\n", count(Complexity::High)));

    let symbols: Vec<_> = analysis.files.iter().flat_map(|f| &f.functions).collect();
    if !symbols.is_empty() {
        let documented = symbols.iter().filter(|s| s.description.is_some()).count();
        output.push_str(&format!(
            "\nDocumented functions: {} of {} ({:.0}%)\n",
            documented,
            symbols.len(),
            documented as f64 * 100.0 / symbols.len() as f64
        ));
    }
    output
}

fn risks(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut output = String::new();
    let mut complex: Vec<_> = analysis
        .files
        .iter()
        .filter(|f| f.complexity == Complexity::High)
        .collect();
    complex.sort_by(|a, b| b.complexity_score.total_cmp(&a.complexity_score));
    for file in complex.iter().take(MAX_RISK_ITEMS) {
        output.push_str(&format!(
            "- High complexity: `{}` (score {:.1})\n",
            file.path, file.complexity_score
        ));
    }
    let markers = analysis.files.iter().flat_map(|f| {
        f.comments
            .iter()
            .filter(|c| c.kind == CommentKind::Marker)
            .map(move |c| (f.path.as_str(), c))
    });
    for (path, marker) in markers.take(MAX_RISK_ITEMS) {
        output.push_str(&format!("- `{}:{}` {}\n", path, marker.line, marker.text));
    }
    if output.is_empty() {
        output.push_str("No high-complexity files or open markers were found.\n");
    }
    output
}

fn glossary(analysis: &ProjectAnalysis, _config: &ProfessionalConfig) -> String {
    let mut terms: Vec<(String, String)> = analysis
        .dependencies
        .iter()
        .filter_map(|d| d.description.as_ref().map(|desc| (d.name.clone(), desc.clone())))
        .collect();
    terms.extend(
        analysis
            .architecture
            .patterns
            .iter()
            .map(|p| (p.clone(), "Architectural pattern detected in this codebase".to_string())),
    );
    if terms.is_empty() {
        return "No project-specific terms were identified.\n".to_string();
    }
    terms.sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));
    terms
        .into_iter()
        .map(|(term, meaning)| format!("- **{}**: {}\n", term, meaning))
        .collect()
}

// =============================================================================
// Compliance
// =============================================================================

const AUTH_LIBRARIES: &[&str] = &["auth", "passport", "jwt", "bcrypt", "argon2", "clerk", "session"];
const DATA_LIBRARIES: &[&str] = &[
    "prisma", "mongoose", "sequelize", "typeorm", "pg", "mysql", "sqlite", "supabase", "firebase", "redis",
    "sqlalchemy", "diesel", "sqlx",
];
const LOGGING_LIBRARIES: &[&str] = &["winston", "pino", "morgan", "bunyan", "loguru", "tracing", "log4js", "sentry"];

fn considerations(framework: ComplianceFramework) -> &'static [&'static str] {
    match framework {
        ComplianceFramework::Soc2 => &[
            "Access to production systems is restricted and reviewed",
            "Changes are tracked through version control and review",
            "Security-relevant events are logged and retained",
        ],
        ComplianceFramework::Gdpr => &[
            "Personal data fields are inventoried",
            "Data subject access and erasure requests can be fulfilled",
            "Processing has a documented lawful basis",
        ],
        ComplianceFramework::Hipaa => &[
            "Protected health information is encrypted at rest and in transit",
            "Access to PHI is logged for audit",
            "Minimum-necessary access is enforced",
        ],
        ComplianceFramework::Iso27001 => &[
            "Information assets are inventoried with owners",
            "Cryptographic controls are documented",
            "Supplier dependencies are assessed",
        ],
        ComplianceFramework::PciDss => &[
            "Cardholder data is never stored unencrypted",
            "Payment flows are isolated from other components",
            "Dependencies are patched on a defined schedule",
        ],
    }
}

fn matching_dependencies<'a>(analysis: &'a ProjectAnalysis, needles: &[&str]) -> Vec<&'a str> {
    analysis
        .dependencies
        .iter()
        .chain(&analysis.dev_dependencies)
        .map(|d| d.name.as_str())
        .filter(|name| needles.iter().any(|n| name.to_ascii_lowercase().contains(n)))
        .collect()
}

fn compliance_appendix(analysis: &ProjectAnalysis, compliance: &ComplianceConfig) -> String {
    let mut output = String::new();

    output.push_str("### Observations\n\n");
    for (label, needles) in [
        ("Authentication", AUTH_LIBRARIES),
        ("Data storage", DATA_LIBRARIES),
        ("Logging and monitoring", LOGGING_LIBRARIES),
    ] {
        let found = matching_dependencies(analysis, needles);
        if found.is_empty() {
            output.push_str(&format!("- {}: no supporting library detected\n", label));
        } else {
            output.push_str(&format!("- {}: {}\n", label, found.join(", ")));
        }
    }
    output.push('\n');

    for framework in &compliance.frameworks {
        output.push_str(&format!("### {}\n\n", framework.label()));
        for item in considerations(*framework) {
            output.push_str(&format!("- [ ] {}\n", item));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_project;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};

    fn project(files: &[(&str, &str)]) -> ProjectAnalysis {
        let mut root = ingest_files(
            "shop",
            files
                .iter()
                .map(|(p, c)| RawFile::new(*p, c.as_bytes().to_vec()))
                .collect(),
        );
        apply_filters(&mut root, &FilterOptions::default());
        analyze_project(&root, "shop")
    }

    fn shop() -> ProjectAnalysis {
        project(&[
            (
                "package.json",
                r#"{"name":"shop","description":"Online store","scripts":{"dev":"vite"},"dependencies":{"react":"^18.2.0","passport":"^0.6.0"}}"#,
            ),
            ("src/App.tsx", "export default function App() {\n  return <div>Shop</div>;\n}\n"),
            (
                "src/services/cart.ts",
                "// TODO: persist carts\nexport interface Cart { id: string; items: string[] }\nexport async function addItem(cart: Cart, item: string) { return cart; }\n",
            ),
        ])
    }

    #[test]
    fn test_registry_covers_every_selection() {
        for document_type in DocumentType::ALL {
            for id in sections_for(document_type) {
                assert!(section_def(*id).is_some(), "{:?} missing from registry", id);
            }
        }
    }

    #[test]
    fn test_each_document_type_renders() {
        let analysis = shop();
        for document_type in DocumentType::ALL {
            let config = ProfessionalConfig {
                document_type,
                ..Default::default()
            };
            let doc = generate_professional(&analysis, &config);
            assert_eq!(doc.doc.sections.len(), sections_for(document_type).len());
            assert!(doc.doc.sections.iter().all(|s| !s.content.is_empty()));
            assert_eq!(doc.doc.metadata, DocMetadata::from_analysis(&analysis));
        }
    }

    #[test]
    fn test_arc42_numbering() {
        let config = ProfessionalConfig {
            document_type: DocumentType::Architecture,
            standard: DocumentationStandard::Arc42,
            ..Default::default()
        };
        let doc = generate_professional(&shop(), &config).doc;
        assert_eq!(doc.sections[0].title, "1. Context and Scope");
        assert_eq!(doc.sections[1].title, "2. Solution Strategy");
        assert!(doc.content.contains("arc42 template"));
    }

    #[test]
    fn test_branding_and_compliance() {
        let config = ProfessionalConfig {
            document_type: DocumentType::ApiReference,
            standard: DocumentationStandard::Default,
            branding: BrandingConfig {
                company_name: Some("Acme".into()),
                confidentiality: Some("Internal".into()),
                ..Default::default()
            },
            compliance: ComplianceConfig {
                frameworks: vec![ComplianceFramework::Gdpr],
                include_audit_trail: true,
            },
        };
        let doc = generate_professional(&shop(), &config).doc;
        assert!(doc.content.contains("| **Organization** | Acme |"));
        assert!(doc.content.contains("© Acme"));
        assert!(doc.content.contains("## Document History"));
        let appendix = doc.section("compliance").unwrap();
        assert!(appendix.content.contains("### GDPR"));
        assert!(appendix.content.contains("Authentication: passport"));
        assert!(doc.section("api-overview").unwrap().content.contains("async addItem(cart: Cart, item: string)"));
    }

    #[test]
    fn test_empty_project_renders() {
        let analysis = project(&[]);
        let config = ProfessionalConfig {
            document_type: DocumentType::Onboarding,
            ..Default::default()
        };
        let doc = generate_professional(&analysis, &config).doc;
        assert_eq!(doc.metadata, DocMetadata::default());
        assert!(doc.section("quick-start").unwrap().content.contains("No manifest"));
    }
}
