//! Workflow and user-story prompt

use crate::constants::prompt;
use crate::types::{
    ProjectAnalysis, RouteKind, WorkflowAnalysisData, estimate_tokens, truncate_to_token_limit,
};

use super::PromptBuilder;

/// Reply schema, embedded verbatim in the prompt
pub const WORKFLOW_SCHEMA: &str = r#"{
  "projectOverview": "string",
  "workflows": [{
    "id": "WF001",
    "name": "string",
    "description": "string",
    "actor": "string",
    "trigger": "string",
    "steps": [{"order": 1, "action": "string", "description": "string", "component": "string"}],
    "outcome": "string",
    "relatedFiles": ["path"]
  }],
  "userStories": [{
    "id": "US001",
    "title": "string",
    "asA": "string",
    "iWant": "string",
    "soThat": "string",
    "acceptanceCriteria": ["string"],
    "priority": "High | Medium | Low",
    "effort": "Small | Medium | Large",
    "complexity": "Simple | Medium | Complex",
    "technicalImplementation": {"components": [], "apiEndpoints": [], "dataEntities": [], "files": []},
    "testScenarios": ["string"],
    "workflowId": "WF001"
  }],
  "capabilities": [{"name": "string", "description": "string", "storyIds": ["US001"], "features": ["string"]}],
  "dataEntities": [{"name": "string", "description": "string", "fields": ["string"], "operations": ["CREATE"]}]
}"#;

pub fn build_workflow_prompt(analysis: &ProjectAnalysis, data: &WorkflowAnalysisData) -> String {
    let summary = &analysis.architecture;
    let mut builder = PromptBuilder::new()
        .role("product analyst", "turning code signals into user workflows and stories")
        .objectives(&[
            "Identify the end-to-end workflows a user can perform in this application",
            "Write user stories with concrete acceptance criteria for each workflow",
            "Group stories into product capabilities",
            "List the core data entities and the operations performed on them",
        ])
        .context_item("Project", analysis.name.as_str())
        .context_item("Type", analysis.project_type.as_str())
        .context_item("Files", analysis.files.len().to_string());
    if let Some(description) = analysis.description() {
        builder = builder.context_item("Description", description);
    }
    if !summary.technologies.is_empty() {
        builder = builder.context_item("Technologies", summary.technologies.join(", "));
    }

    // Signal sections share one budget, spent in order of importance
    let mut budget = prompt::SIGNAL_TOKEN_BUDGET;
    for (header, body) in [
        ("API Routes", routes_section(data)),
        ("Data Operations", data_section(data)),
        ("Authentication", auth_section(data)),
        ("UI Interactions", ui_section(data)),
        ("Business Logic", business_section(data)),
    ] {
        if budget == 0 || body.is_empty() {
            continue;
        }
        let body = truncate_to_token_limit(&body, budget);
        budget = budget.saturating_sub(estimate_tokens(&body));
        builder = builder.section(header, &body);
    }

    builder
        .section("Output Schema", "Reply with a single JSON object of this shape:")
        .code("json", WORKFLOW_SCHEMA)
        .rules(&[
            "Respond ONLY with the JSON object, no explanation",
            "Base every workflow on the signals above; do not invent features",
            "Use sequential ids: WF001, WF002, ... and US001, US002, ...",
            "Every user story references the workflow it belongs to via workflowId",
        ])
        .build()
}

fn routes_section(data: &WorkflowAnalysisData) -> String {
    let mut out = String::new();
    for route in data.routes.iter().take(prompt::MAX_ROUTES) {
        out.push_str(&format!("- {} {} ({}:{})", route.method, route.path, route.file, route.line));
        if route.kind == RouteKind::UiRoute
            && let Some(component) = &route.component
        {
            out.push_str(&format!(" renders {}", component));
        }
        if !route.middleware.is_empty() {
            out.push_str(&format!(" via {}", route.middleware.join(", ")));
        }
        out.push('\n');
    }
    push_elided(&mut out, data.routes.len(), prompt::MAX_ROUTES);
    out
}

fn data_section(data: &WorkflowAnalysisData) -> String {
    let mut out = String::new();
    for op in data.data_operations.iter().take(prompt::MAX_DATA_OPERATIONS) {
        out.push_str(&format!(
            "- {} {}.{} ",
            op.verb.as_str(),
            op.store,
            op.operation
        ));
        if let Some(entity) = &op.entity {
            out.push_str(&format!("on {} ", entity));
        }
        out.push_str(&format!("({}:{})\n", op.file, op.line));
    }
    push_elided(&mut out, data.data_operations.len(), prompt::MAX_DATA_OPERATIONS);
    out
}

fn auth_section(data: &WorkflowAnalysisData) -> String {
    let auth = &data.auth;
    if auth.is_empty() {
        return String::new();
    }
    let join = |set: &std::collections::BTreeSet<String>| {
        set.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    };
    format!(
        "- Methods: {}\n- Providers: {}\n- Flows: {}\n",
        join(&auth.methods),
        join(&auth.providers),
        join(&auth.flows)
    )
}

fn ui_section(data: &WorkflowAnalysisData) -> String {
    let mut out = String::new();
    for record in data.ui_interactions.iter().take(prompt::MAX_UI_RECORDS) {
        out.push_str(&format!("- {}", record.file));
        let components: Vec<&str> = record.components.iter().map(|c| c.name.as_str()).collect();
        if !components.is_empty() {
            out.push_str(&format!(" components: {}", components.join(", ")));
        }
        for form in &record.forms {
            out.push_str(&format!(" | form [{}]", form.fields.join(", ")));
            if let Some(handler) = &form.submit_handler {
                out.push_str(&format!(" -> {}", handler));
            }
        }
        let targets: Vec<&str> = record.navigation.iter().map(|n| n.target.as_str()).collect();
        if !targets.is_empty() {
            out.push_str(&format!(" | navigates to {}", targets.join(", ")));
        }
        out.push('\n');
    }
    push_elided(&mut out, data.ui_interactions.len(), prompt::MAX_UI_RECORDS);
    out
}

fn business_section(data: &WorkflowAnalysisData) -> String {
    let mut out = String::new();
    for record in data.business_logic.iter().take(prompt::MAX_BUSINESS_RECORDS) {
        let mut parts = Vec::new();
        if !record.validations.is_empty() {
            parts.push(format!("validates {}", record.validations.join(", ")));
        }
        if !record.calculations.is_empty() {
            parts.push(format!("calculates {}", record.calculations.join(", ")));
        }
        if !record.workflows.is_empty() {
            parts.push(format!("processes {}", record.workflows.join(", ")));
        }
        if parts.is_empty() {
            continue;
        }
        out.push_str(&format!("- {}: {}\n", record.file, parts.join("; ")));
    }
    push_elided(&mut out, data.business_logic.len(), prompt::MAX_BUSINESS_RECORDS);
    out
}

fn push_elided(out: &mut String, total: usize, cap: usize) {
    if total > cap {
        out.push_str(&format!("- ... and {} more\n", total - cap));
    }
}
