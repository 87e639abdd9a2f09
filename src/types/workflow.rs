//! Workflow extraction signals and the generation result schema

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::utils::ParseWithDefault;

// =============================================================================
// Extracted Signals
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// `app.get(...)`, decorators, `route(...)` registration
    Registered,
    /// Handler exported from a file-system routed module
    FileSystem,
    /// Declarative client-side route element
    UiRoute,
}

impl RouteKind {
    pub fn label(&self) -> &'static str {
        match self {
            RouteKind::Registered => "registered",
            RouteKind::FileSystem => "file-system",
            RouteKind::UiRoute => "ui",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    /// Upper-case HTTP verb, or `VIEW` for UI routes
    pub method: String,
    pub path: String,
    pub kind: RouteKind,
    pub file: String,
    pub line: usize,
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInteraction {
    pub name: String,
    pub props: Vec<String>,
    pub hooks: Vec<String>,
    pub handlers: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRecord {
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_handler: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandlerRecord {
    /// `onClick`, `@submit`, ...
    pub event: String,
    pub handler: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRecord {
    pub target: String,
    /// Mechanism that triggered the navigation (`navigate`, `router.push`, `Link`, ...)
    pub via: String,
    pub line: usize,
}

/// UI interaction surface of one frontend-shaped file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiInteractionRecord {
    pub file: String,
    pub components: Vec<ComponentInteraction>,
    pub forms: Vec<FormRecord>,
    pub event_handlers: Vec<EventHandlerRecord>,
    pub navigation: Vec<NavigationRecord>,
}

impl UiInteractionRecord {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.forms.is_empty()
            && self.event_handlers.is_empty()
            && self.navigation.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Orm,
    DocumentStore,
    Sql,
    Http,
}

impl AccessKind {
    pub fn label(&self) -> &'static str {
        match self {
            AccessKind::Orm => "ORM",
            AccessKind::DocumentStore => "Document store",
            AccessKind::Sql => "SQL",
            AccessKind::Http => "HTTP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrudVerb {
    Create,
    Read,
    Update,
    Delete,
    Unknown,
}

impl CrudVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudVerb::Create => "CREATE",
            CrudVerb::Read => "READ",
            CrudVerb::Update => "UPDATE",
            CrudVerb::Delete => "DELETE",
            CrudVerb::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOperation {
    pub file: String,
    pub line: usize,
    pub access: AccessKind,
    /// Client or store the call goes through (`prisma`, `supabase`, `fetch`, ...)
    pub store: String,
    pub operation: String,
    pub verb: CrudVerb,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFlowSignals {
    pub methods: BTreeSet<String>,
    pub providers: BTreeSet<String>,
    pub flows: BTreeSet<String>,
    pub files: BTreeSet<String>,
}

impl AuthFlowSignals {
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.providers.is_empty() && self.flows.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessLogicRecord {
    pub file: String,
    pub validations: Vec<String>,
    pub calculations: Vec<String>,
    pub workflows: Vec<String>,
    pub functions: Vec<String>,
}

impl BusinessLogicRecord {
    pub fn is_empty(&self) -> bool {
        self.validations.is_empty()
            && self.calculations.is_empty()
            && self.workflows.is_empty()
            && self.functions.is_empty()
    }
}

/// Everything the workflow extractor recovered for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAnalysisData {
    pub routes: Vec<RouteRecord>,
    pub ui_interactions: Vec<UiInteractionRecord>,
    pub data_operations: Vec<DataOperation>,
    pub auth: AuthFlowSignals,
    pub business_logic: Vec<BusinessLogicRecord>,
}

impl WorkflowAnalysisData {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
            && self.ui_interactions.is_empty()
            && self.data_operations.is_empty()
            && self.auth.is_empty()
            && self.business_logic.is_empty()
    }

    pub fn form_count(&self) -> usize {
        self.ui_interactions.iter().map(|u| u.forms.len()).sum()
    }
}

// =============================================================================
// Generation Result (camelCase wire schema)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Effort {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StoryComplexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl ParseWithDefault for Priority {
    fn type_name() -> &'static str {
        "Priority"
    }

    fn default_value() -> Self {
        Priority::Medium
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" | "must" => Some(Priority::High),
            "medium" | "normal" | "should" => Some(Priority::Medium),
            "low" | "could" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl ParseWithDefault for Effort {
    fn type_name() -> &'static str {
        "Effort"
    }

    fn default_value() -> Self {
        Effort::Medium
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" | "s" | "low" => Some(Effort::Small),
            "medium" | "m" => Some(Effort::Medium),
            "large" | "l" | "high" => Some(Effort::Large),
            _ => None,
        }
    }
}

impl ParseWithDefault for StoryComplexity {
    fn type_name() -> &'static str {
        "StoryComplexity"
    }

    fn default_value() -> Self {
        StoryComplexity::Medium
    }

    fn try_parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" | "low" | "easy" => Some(StoryComplexity::Simple),
            "medium" | "moderate" => Some(StoryComplexity::Medium),
            "complex" | "high" | "hard" => Some(StoryComplexity::Complex),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStep {
    pub order: u32,
    pub action: String,
    pub description: String,
    pub component: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub actor: String,
    pub trigger: String,
    pub steps: Vec<WorkflowStep>,
    pub outcome: String,
    pub related_files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalImplementation {
    pub components: Vec<String>,
    pub api_endpoints: Vec<String>,
    pub data_entities: Vec<String>,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStory {
    pub id: String,
    pub title: String,
    pub as_a: String,
    pub i_want: String,
    pub so_that: String,
    pub acceptance_criteria: Vec<String>,
    pub priority: Priority,
    pub effort: Effort,
    pub complexity: StoryComplexity,
    pub technical_implementation: TechnicalImplementation,
    pub test_scenarios: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub story_ids: Vec<String>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataEntity {
    pub name: String,
    pub description: String,
    pub fields: Vec<String>,
    pub operations: Vec<String>,
}

/// Schema shared by the model path and the deterministic fallback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGenerationResult {
    pub project_overview: String,
    pub workflows: Vec<Workflow>,
    pub user_stories: Vec<UserStory>,
    pub capabilities: Vec<Capability>,
    pub data_entities: Vec<DataEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_is_lenient() {
        assert_eq!(Priority::parse_or_default("HIGH"), Priority::High);
        assert_eq!(Priority::parse_or_default(" low "), Priority::Low);
        assert_eq!(Priority::parse_or_default("urgent-ish"), Priority::Medium);
        assert_eq!(Effort::parse_or_default(""), Effort::Medium);
        assert_eq!(StoryComplexity::parse_or_default("hard"), StoryComplexity::Complex);
    }

    #[test]
    fn test_generation_result_uses_camel_case() {
        let result = WorkflowGenerationResult {
            project_overview: "Demo".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("projectOverview").is_some());
        assert!(json["userStories"].as_array().unwrap().is_empty());
        assert!(json["dataEntities"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_crud_verb_wire_format() {
        assert_eq!(serde_json::to_string(&CrudVerb::Delete).unwrap(), "\"DELETE\"");
        assert_eq!(CrudVerb::Unknown.as_str(), "UNKNOWN");
    }
}
