//! Markdown for extracted workflow signals and generated workflows/stories

use crate::types::{RouteKind, WorkflowAnalysisData, WorkflowGenerationResult};

const MAX_ROUTES: usize = 100;
const MAX_OPERATIONS: usize = 100;

pub fn render_workflow_analysis(data: &WorkflowAnalysisData) -> String {
    let mut output = String::from("# Workflow Signals\n\n");
    if data.is_empty() {
        output.push_str("No routes, UI interactions, data operations, or auth flows were detected.\n");
        return output;
    }

    // Routes
    if !data.routes.is_empty() {
        output.push_str("## Routes\n\n| Method | Path | Kind | Location | Handler |\n|---|---|---|---|---|\n");
        for route in data.routes.iter().take(MAX_ROUTES) {
            let handler = match (&route.component, &route.handler) {
                (Some(component), _) => format!("<{}>", component),
                (None, Some(handler)) => handler.replace('|', "\\|"),
                (None, None) => String::new(),
            };
            output.push_str(&format!(
                "| {} | `{}` | {} | `{}:{}` | {} |\n",
                route.method,
                route.path,
                route.kind.label(),
                route.file,
                route.line,
                if handler.is_empty() { "-".to_string() } else { format!("`{}`", handler) }
            ));
        }
        if data.routes.len() > MAX_ROUTES {
            output.push_str(&format!("\n{} more routes omitted.\n", data.routes.len() - MAX_ROUTES));
        }
        let protected = data.routes.iter().filter(|r| !r.middleware.is_empty()).count();
        if protected > 0 {
            output.push_str(&format!("\n{} routes pass through middleware.\n", protected));
        }
        output.push('\n');
    }

    // UI
    if !data.ui_interactions.is_empty() {
        output.push_str("## UI Interactions\n\n");
        for record in &data.ui_interactions {
            output.push_str(&format!("### `{}`\n\n", record.file));
            for component in &record.components {
                output.push_str(&format!("- Component **{}**", component.name));
                if !component.props.is_empty() {
                    output.push_str(&format!(", props: {}", component.props.join(", ")));
                }
                if !component.hooks.is_empty() {
                    output.push_str(&format!(", hooks: {}", component.hooks.join(", ")));
                }
                if !component.handlers.is_empty() {
                    output.push_str(&format!(", handlers: {}", component.handlers.join(", ")));
                }
                output.push('\n');
            }
            for form in &record.forms {
                output.push_str(&format!(
                    "- Form (line {}) fields: {}",
                    form.line,
                    if form.fields.is_empty() { "none".to_string() } else { form.fields.join(", ") }
                ));
                if let Some(submit) = &form.submit_handler {
                    output.push_str(&format!(", submits via `{}`", submit));
                }
                output.push('\n');
            }
            for handler in &record.event_handlers {
                output.push_str(&format!("- On `{}`: `{}`\n", handler.event, handler.handler));
            }
            for nav in &record.navigation {
                output.push_str(&format!("- Navigates to `{}` via {}\n", nav.target, nav.via));
            }
            output.push('\n');
        }
    }

    // Data
    if !data.data_operations.is_empty() {
        output.push_str("## Data Operations\n\n| Verb | Entity | Access | Store | Operation | Location |\n|---|---|---|---|---|---|\n");
        for op in data.data_operations.iter().take(MAX_OPERATIONS) {
            output.push_str(&format!(
                "| {} | {} | {} | {} | `{}` | `{}:{}` |\n",
                op.verb.as_str(),
                op.entity.as_deref().unwrap_or("-"),
                op.access.label(),
                op.store,
                op.operation,
                op.file,
                op.line
            ));
        }
        if data.data_operations.len() > MAX_OPERATIONS {
            output.push_str(&format!(
                "\n{} more operations omitted.\n",
                data.data_operations.len() - MAX_OPERATIONS
            ));
        }
        output.push('\n');
    }

    // Auth
    if !data.auth.is_empty() {
        output.push_str("## Authentication\n\n");
        for (label, set) in [
            ("Methods", &data.auth.methods),
            ("Providers", &data.auth.providers),
            ("Flows", &data.auth.flows),
        ] {
            if !set.is_empty() {
                output.push_str(&format!(
                    "- **{}:** {}\n",
                    label,
                    set.iter().cloned().collect::<Vec<_>>().join(", ")
                ));
            }
        }
        output.push_str(&format!(
            "- **Files:** {}\n\n",
            data.auth.files.iter().map(|f| format!("`{}`", f)).collect::<Vec<_>>().join(", ")
        ));
    }

    // Business logic
    let interesting: Vec<_> = data
        .business_logic
        .iter()
        .filter(|b| !b.validations.is_empty() || !b.calculations.is_empty() || !b.workflows.is_empty())
        .collect();
    if !interesting.is_empty() {
        output.push_str("## Business Logic\n\n");
        for record in interesting {
            output.push_str(&format!("### `{}`\n\n", record.file));
            for (label, names) in [
                ("Validation", &record.validations),
                ("Calculation", &record.calculations),
                ("Workflow", &record.workflows),
            ] {
                if !names.is_empty() {
                    output.push_str(&format!("- {}: {}\n", label, names.join(", ")));
                }
            }
            output.push('\n');
        }
    }
    output
}

pub fn render_workflow_result(result: &WorkflowGenerationResult) -> String {
    let mut output = String::from("# Workflows and User Stories\n\n");
    if !result.project_overview.is_empty() {
        output.push_str(&format!("{}\n\n", result.project_overview));
    }

    if !result.workflows.is_empty() {
        output.push_str("## Workflows\n\n");
        for workflow in &result.workflows {
            output.push_str(&format!("### {}: {}\n\n", workflow.id, workflow.name));
            if !workflow.description.is_empty() {
                output.push_str(&format!("{}\n\n", workflow.description));
            }
            output.push_str(&format!("- **Actor:** {}\n", workflow.actor));
            output.push_str(&format!("- **Trigger:** {}\n", workflow.trigger));
            output.push_str(&format!("- **Outcome:** {}\n\n", workflow.outcome));
            for step in &workflow.steps {
                output.push_str(&format!("{}. **{}**: {}", step.order, step.action, step.description));
                if !step.component.is_empty() {
                    output.push_str(&format!(" (`{}`)", step.component));
                }
                output.push('\n');
            }
            if !workflow.related_files.is_empty() {
                output.push_str(&format!(
                    "\nRelated files: {}\n",
                    workflow
                        .related_files
                        .iter()
                        .map(|f| format!("`{}`", f))
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            output.push('\n');
        }
    }

    if !result.user_stories.is_empty() {
        output.push_str("## User Stories\n\n");
        for story in &result.user_stories {
            output.push_str(&format!("### {}: {}\n\n", story.id, story.title));
            output.push_str(&format!(
                "As a **{}**, I want **{}**, so that **{}**.\n\n",
                story.as_a, story.i_want, story.so_that
            ));
            output.push_str(&format!(
                "Priority: {:?} · Effort: {:?} · Complexity: {:?}",
                story.priority, story.effort, story.complexity
            ));
            if let Some(workflow_id) = &story.workflow_id {
                output.push_str(&format!(" · Workflow: {}", workflow_id));
            }
            output.push_str("\n\n");
            if !story.acceptance_criteria.is_empty() {
                output.push_str("**Acceptance criteria**\n\n");
                for criterion in &story.acceptance_criteria {
                    output.push_str(&format!("- [ ] {}\n", criterion));
                }
                output.push('\n');
            }
            let tech = &story.technical_implementation;
            let pointers: Vec<String> = [
                ("Components", &tech.components),
                ("Endpoints", &tech.api_endpoints),
                ("Entities", &tech.data_entities),
                ("Files", &tech.files),
            ]
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(label, items)| format!("{}: {}", label, items.join(", ")))
            .collect();
            if !pointers.is_empty() {
                output.push_str(&format!("**Implementation:** {}\n\n", pointers.join("; ")));
            }
            if !story.test_scenarios.is_empty() {
                output.push_str("**Test scenarios**\n\n");
                for scenario in &story.test_scenarios {
                    output.push_str(&format!("- {}\n", scenario));
                }
                output.push('\n');
            }
        }
    }

    if !result.capabilities.is_empty() {
        output.push_str("## Capabilities\n\n");
        for capability in &result.capabilities {
            output.push_str(&format!("- **{}**: {}", capability.name, capability.description));
            if !capability.story_ids.is_empty() {
                output.push_str(&format!(" ({})", capability.story_ids.join(", ")));
            }
            output.push('\n');
        }
        output.push('\n');
    }

    if !result.data_entities.is_empty() {
        output.push_str("## Data Entities\n\n| Entity | Fields | Operations |\n|---|---|---|\n");
        for entity in &result.data_entities {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                entity.name,
                entity.fields.join(", "),
                entity.operations.join(", ")
            ));
        }
    }
    output
}

/// Routes that serve HTTP rather than client-side views
pub fn api_routes(data: &WorkflowAnalysisData) -> impl Iterator<Item = &crate::types::RouteRecord> {
    data.routes.iter().filter(|r| r.kind != RouteKind::UiRoute)
}
