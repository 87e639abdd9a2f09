//! Analysis result types
//!
//! Produced once per run by the analyzer and immutable afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::node::FileNode;
use crate::analyzer::language::Language;

// =============================================================================
// Symbols
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Property,
    Class,
    Interface,
    TypeAlias,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

/// One parsed parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            optional: false,
            default_value: None,
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, "?")?;
        }
        if let Some(hint) = &self.type_hint {
            write!(f, ": {}", hint)?;
        }
        Ok(())
    }
}

/// A recovered function, method, property, class, or interface declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub name: String,
    pub kind: SymbolKind,
    #[serde(default)]
    pub params: Vec<Parameter>,
    /// Declared return type (or property type for properties)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    /// 1-based declaring line
    pub line: usize,
    #[serde(default)]
    pub is_exported: bool,
    #[serde(default)]
    pub is_async: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_component: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SymbolRecord {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            params: Vec::new(),
            return_type: None,
            line,
            is_exported: false,
            is_async: false,
            is_static: false,
            is_component: false,
            visibility: None,
            description: None,
        }
    }

    /// `name(a: T, b)` style signature
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        match &self.return_type {
            Some(ret) => format!("{}({}): {}", self.name, params, ret),
            None => format!("{}({})", self.name, params),
        }
    }

    /// Conventional React-style hook name (`useSomething`)
    pub fn is_hook(&self) -> bool {
        let mut chars = self.name.chars();
        self.name.starts_with("use")
            && chars.nth(3).map(|c| c.is_ascii_uppercase()).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub symbol: SymbolRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub methods: Vec<SymbolRecord>,
    #[serde(default)]
    pub properties: Vec<SymbolRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub symbol: SymbolRecord,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub members: Vec<SymbolRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_import: Option<String>,
    #[serde(default)]
    pub named: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default)]
    pub is_type_only: bool,
    pub line: usize,
}

impl ImportRecord {
    /// Relative imports point inside the project
    pub fn is_relative(&self) -> bool {
        self.source.starts_with('.') || self.source.starts_with('/')
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Named,
    Default,
    ReExport,
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    pub kind: ExportKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// `/** ... */` documentation block
    Doc,
    /// TODO / FIXME / HACK / NOTE marker
    Marker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub line: usize,
    pub kind: CommentKind,
    pub text: String,
}

// =============================================================================
// File Analysis
// =============================================================================

/// Role of a file inside the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Component,
    Service,
    Utility,
    Config,
    Type,
    Style,
    Test,
    Other,
}

impl FileCategory {
    pub const ALL: [FileCategory; 8] = [
        FileCategory::Component,
        FileCategory::Service,
        FileCategory::Utility,
        FileCategory::Config,
        FileCategory::Type,
        FileCategory::Style,
        FileCategory::Test,
        FileCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Component => "component",
            FileCategory::Service => "service",
            FileCategory::Utility => "utility",
            FileCategory::Config => "config",
            FileCategory::Type => "type",
            FileCategory::Style => "style",
            FileCategory::Test => "test",
            FileCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for FileCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Complexity::Low => write!(f, "low"),
            Complexity::Medium => write!(f, "medium"),
            Complexity::High => write!(f, "high"),
        }
    }
}

/// Frameworks recognized by content/path probes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Framework {
    NextJs,
    Nuxt,
    React,
    Vue,
    Angular,
    Svelte,
    NestJs,
    Express,
    Fastify,
    Koa,
    Django,
    Flask,
    FastApi,
}

impl Framework {
    pub fn display_name(&self) -> &'static str {
        match self {
            Framework::NextJs => "Next.js",
            Framework::Nuxt => "Nuxt",
            Framework::React => "React",
            Framework::Vue => "Vue",
            Framework::Angular => "Angular",
            Framework::Svelte => "Svelte",
            Framework::NestJs => "NestJS",
            Framework::Express => "Express",
            Framework::Fastify => "Fastify",
            Framework::Koa => "Koa",
            Framework::Django => "Django",
            Framework::Flask => "Flask",
            Framework::FastApi => "FastAPI",
        }
    }
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-file analysis result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub path: String,
    pub name: String,
    pub language: Language,
    pub category: FileCategory,
    #[serde(default)]
    pub functions: Vec<SymbolRecord>,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub interfaces: Vec<InterfaceRecord>,
    #[serde(default)]
    pub imports: Vec<ImportRecord>,
    #[serde(default)]
    pub exports: Vec<ExportRecord>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<Framework>,
    pub is_entry_point: bool,
    pub complexity: Complexity,
    pub complexity_score: f64,
    pub line_count: usize,
    /// Original content, carried forward for workflow extraction
    #[serde(skip)]
    pub content: String,
}

impl FileAnalysis {
    /// Functions flagged as UI components
    pub fn components(&self) -> impl Iterator<Item = &SymbolRecord> {
        self.functions.iter().filter(|f| f.is_component)
    }

    pub fn has_symbols(&self) -> bool {
        !self.functions.is_empty() || !self.classes.is_empty() || !self.interfaces.is_empty()
    }
}

// =============================================================================
// Dependencies & Manifest
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyCategory {
    Framework,
    Ui,
    Utility,
    Build,
    Testing,
    Styling,
    Api,
    Other,
}

impl DependencyCategory {
    pub fn label(&self) -> &'static str {
        match self {
            DependencyCategory::Framework => "Framework",
            DependencyCategory::Ui => "UI",
            DependencyCategory::Utility => "Utility",
            DependencyCategory::Build => "Build",
            DependencyCategory::Testing => "Testing",
            DependencyCategory::Styling => "Styling",
            DependencyCategory::Api => "API & Data",
            DependencyCategory::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    pub name: String,
    pub version: String,
    pub category: DependencyCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestKind {
    PackageJson,
    CargoToml,
    Requirements,
    PyProject,
    GoMod,
}

impl ManifestKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "package.json",
            ManifestKind::CargoToml => "Cargo.toml",
            ManifestKind::Requirements => "requirements.txt",
            ManifestKind::PyProject => "pyproject.toml",
            ManifestKind::GoMod => "go.mod",
        }
    }
}

/// Parsed dependency-declaration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub kind: ManifestKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl Manifest {
    pub fn empty(kind: ManifestKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            name: None,
            version: None,
            description: None,
            scripts: BTreeMap::new(),
            dependencies: BTreeMap::new(),
            dev_dependencies: BTreeMap::new(),
        }
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }
}

// =============================================================================
// Project Analysis
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitectureSummary {
    pub patterns: Vec<String>,
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_tool: Option<String>,
}

/// Aggregate root handed to the synthesizer and the workflow extractor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub name: String,
    pub project_type: String,
    pub structure: FileNode,
    pub files: Vec<FileAnalysis>,
    pub dependencies: Vec<DependencyRecord>,
    pub dev_dependencies: Vec<DependencyRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Manifest>,
    pub entry_points: Vec<String>,
    pub architecture: ArchitectureSummary,
}

impl ProjectAnalysis {
    pub fn files_in(&self, category: FileCategory) -> impl Iterator<Item = &FileAnalysis> {
        self.files.iter().filter(move |f| f.category == category)
    }

    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|f| f.line_count).sum()
    }

    pub fn description(&self) -> Option<&str> {
        self.manifest.as_ref().and_then(|m| m.description.as_deref())
    }
}
