//! Deterministic workflow generation from extracted signals
//!
//! Used whenever the model path is unavailable or its reply is unusable.
//! Output is smaller than a model reply but has the same shape and goes
//! through the same repair pass.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{
    Capability, DataEntity, Effort, Priority, ProjectAnalysis, RouteKind, RouteRecord,
    StoryComplexity, TechnicalImplementation, UserStory, Workflow, WorkflowAnalysisData,
    WorkflowGenerationResult, WorkflowStep, capitalize_first, humanize_identifier,
};

use super::validation::repair_generation_result;

/// Resources turned into CRUD workflows
const MAX_RESOURCES: usize = 8;
const MAX_FORM_WORKFLOWS: usize = 5;
const MAX_RELATED_FILES: usize = 10;

/// Auth flow label -> (story want, story benefit, step action)
const AUTH_FLOWS: &[(&str, &str, &str, &str)] = &[
    ("Registration", "to create an account", "I can use the application", "Submit registration form"),
    ("Login", "to sign in", "I can access my data", "Submit credentials"),
    ("Email verification", "to verify my email address", "my account is trusted", "Confirm verification link"),
    ("Password reset", "to reset a forgotten password", "I can regain access", "Request password reset"),
    ("Token refresh", "my session to stay valid while I work", "I am not signed out unexpectedly", "Refresh session token"),
    ("Route protection", "private pages to require sign-in", "my data stays private", "Guard protected routes"),
    ("Logout", "to sign out", "nobody else can use my session", "End session"),
];

pub fn generate_fallback(
    analysis: &ProjectAnalysis,
    data: &WorkflowAnalysisData,
) -> WorkflowGenerationResult {
    let mut result = WorkflowGenerationResult {
        project_overview: overview(analysis, data),
        ..Default::default()
    };

    if !data.auth.is_empty() {
        push_auth(&mut result, data);
    }
    push_resources(&mut result, data);
    push_forms(&mut result, data);
    result.data_entities = data_entities(data);

    if result.workflows.is_empty() && result.user_stories.is_empty() {
        push_getting_started(&mut result, analysis);
    }

    repair_generation_result(result)
}

fn overview(analysis: &ProjectAnalysis, data: &WorkflowAnalysisData) -> String {
    let mut text = format!(
        "{} is a {} project with {} analyzed files",
        analysis.name,
        analysis.project_type,
        analysis.files.len()
    );
    let api_routes = data.routes.iter().filter(|r| r.kind != RouteKind::UiRoute).count();
    if api_routes > 0 {
        text.push_str(&format!(", {} API routes", api_routes));
    }
    if !data.data_operations.is_empty() {
        text.push_str(&format!(" and {} data operations", data.data_operations.len()));
    }
    text.push('.');
    if let Some(description) = analysis.description() {
        text.push(' ');
        text.push_str(description);
    }
    text
}

fn new_story(id: String, title: &str, want: &str, so_that: &str, workflow_id: &str) -> UserStory {
    UserStory {
        id,
        title: title.to_string(),
        as_a: "user".to_string(),
        i_want: want.to_string(),
        so_that: so_that.to_string(),
        acceptance_criteria: Vec::new(),
        priority: Priority::Medium,
        effort: Effort::Medium,
        complexity: StoryComplexity::Medium,
        technical_implementation: TechnicalImplementation::default(),
        test_scenarios: Vec::new(),
        workflow_id: Some(workflow_id.to_string()),
    }
}

fn step(action: &str, description: String, component: &str) -> WorkflowStep {
    WorkflowStep {
        order: 0,
        action: action.to_string(),
        description,
        component: component.to_string(),
    }
}

// =============================================================================
// Authentication
// =============================================================================

fn push_auth(result: &mut WorkflowGenerationResult, data: &WorkflowAnalysisData) {
    let auth = &data.auth;
    let workflow_id = "auth";
    let files: Vec<String> = auth.files.iter().take(MAX_RELATED_FILES).cloned().collect();
    let methods = auth.methods.iter().cloned().collect::<Vec<_>>().join(", ");
    let providers = auth.providers.iter().cloned().collect::<Vec<_>>();

    // Flows present, or a plain sign-in when only methods/providers were seen
    let flows: Vec<&(&str, &str, &str, &str)> = if auth.flows.is_empty() {
        AUTH_FLOWS.iter().filter(|f| f.0 == "Login").collect()
    } else {
        AUTH_FLOWS.iter().filter(|f| auth.flows.contains(f.0)).collect()
    };

    let mut steps = Vec::new();
    let mut story_ids = Vec::new();
    for (label, want, so_that, action) in flows {
        steps.push(step(action, format!("{} flow", label), files.first().map_or("", String::as_str)));

        let id = format!("auth-{}", label.to_lowercase().replace(' ', "-"));
        let mut story = new_story(id.clone(), label, want, so_that, workflow_id);
        story.priority = Priority::High;
        story.acceptance_criteria.push(format!("{} completes successfully with valid input", label));
        story.acceptance_criteria.push("Invalid input shows an error and changes nothing".to_string());
        if !methods.is_empty() {
            story.acceptance_criteria.push(format!("Uses {}", methods));
        }
        story.technical_implementation.files = files.clone();
        story.test_scenarios.push(format!("{} with valid credentials", label));
        story.test_scenarios.push(format!("{} with invalid credentials", label));
        story_ids.push(id);
        result.user_stories.push(story);
    }

    let mut description = "Users prove who they are before accessing protected features".to_string();
    if !providers.is_empty() {
        description.push_str(&format!(" (via {})", providers.join(", ")));
    }

    result.workflows.push(Workflow {
        id: workflow_id.to_string(),
        name: "User Authentication".to_string(),
        description: description.clone(),
        actor: "User".to_string(),
        trigger: "User opens a protected page or the sign-in screen".to_string(),
        steps,
        outcome: "User holds an authenticated session".to_string(),
        related_files: files,
    });
    result.capabilities.push(Capability {
        name: "Authentication".to_string(),
        description,
        story_ids,
        features: auth
            .methods
            .iter()
            .chain(auth.providers.iter())
            .cloned()
            .collect(),
    });
}

// =============================================================================
// API resources
// =============================================================================

fn resource_of(route: &RouteRecord) -> Option<String> {
    route
        .path
        .split('/')
        .filter(|s| !s.is_empty())
        .find(|s| {
            !s.starts_with(':')
                && !s.starts_with('{')
                && !s.starts_with('[')
                && !s.starts_with('<')
                && *s != "*"
                && !matches!(*s, "api" | "v1" | "v2" | "v3")
        })
        .map(|s| s.to_lowercase())
}

fn verb_action(method: &str, resource: &str) -> (&'static str, String) {
    match method {
        "GET" => ("View", format!("view {}", resource)),
        "POST" => ("Create", format!("create {}", resource)),
        "PUT" | "PATCH" => ("Update", format!("update {}", resource)),
        "DELETE" => ("Delete", format!("delete {}", resource)),
        _ => ("Call", format!("work with {}", resource)),
    }
}

fn push_resources(result: &mut WorkflowGenerationResult, data: &WorkflowAnalysisData) {
    let mut resources: BTreeMap<String, Vec<&RouteRecord>> = BTreeMap::new();
    for route in data.routes.iter().filter(|r| r.kind != RouteKind::UiRoute) {
        if let Some(resource) = resource_of(route) {
            resources.entry(resource).or_default().push(route);
        }
    }

    for (resource, routes) in resources.into_iter().take(MAX_RESOURCES) {
        let label = humanize_identifier(&resource);
        let workflow_id = format!("resource-{}", resource);
        let endpoints: Vec<String> = routes.iter().map(|r| format!("{} {}", r.method, r.path)).collect();
        let files: BTreeSet<String> = routes.iter().map(|r| r.file.clone()).collect();
        let files: Vec<String> = files.into_iter().take(MAX_RELATED_FILES).collect();
        let entities: Vec<String> = data
            .data_operations
            .iter()
            .filter_map(|op| op.entity.as_deref())
            .filter(|e| resource.starts_with(&e.to_lowercase()) || e.to_lowercase().starts_with(&resource))
            .map(capitalize_first)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut steps = Vec::new();
        let mut criteria = Vec::new();
        for route in &routes {
            let (action, phrase) = verb_action(&route.method, &label.to_lowercase());
            steps.push(step(
                action,
                format!("{} {}", route.method, route.path),
                &route.file,
            ));
            criteria.push(format!("I can {} through {} {}", phrase, route.method, route.path));
        }
        let middleware: BTreeSet<&str> = routes
            .iter()
            .flat_map(|r| r.middleware.iter().map(String::as_str))
            .collect();
        if !middleware.is_empty() {
            criteria.push(format!(
                "Requests pass through {}",
                middleware.into_iter().collect::<Vec<_>>().join(", ")
            ));
        }

        let story_id = format!("story-{}", resource);
        let mut story = new_story(
            story_id.clone(),
            &format!("Manage {}", label),
            &format!("to manage {}", label.to_lowercase()),
            &format!("{} data stays up to date", label),
            &workflow_id,
        );
        story.acceptance_criteria = criteria;
        story.effort = match routes.len() {
            0..=2 => Effort::Small,
            3..=5 => Effort::Medium,
            _ => Effort::Large,
        };
        story.technical_implementation = TechnicalImplementation {
            components: Vec::new(),
            api_endpoints: endpoints.clone(),
            data_entities: entities,
            files: files.clone(),
        };
        story.test_scenarios = endpoints.iter().map(|e| format!("{} returns a success response", e)).collect();
        result.user_stories.push(story);

        result.workflows.push(Workflow {
            id: workflow_id,
            name: format!("Manage {}", label),
            description: format!("Operations on {} exposed by the API", label.to_lowercase()),
            actor: "User".to_string(),
            trigger: format!("Client calls a {} endpoint", label.to_lowercase()),
            steps,
            outcome: format!("{} data is read or changed", label),
            related_files: files,
        });
        result.capabilities.push(Capability {
            name: format!("{} Management", label),
            description: format!("API surface for {}", label.to_lowercase()),
            story_ids: vec![story_id],
            features: endpoints,
        });
    }
}

// =============================================================================
// Forms
// =============================================================================

fn push_forms(result: &mut WorkflowGenerationResult, data: &WorkflowAnalysisData) {
    let forms = data
        .ui_interactions
        .iter()
        .flat_map(|record| record.forms.iter().map(move |form| (record, form)))
        .filter(|(_, form)| !form.fields.is_empty())
        .take(MAX_FORM_WORKFLOWS);

    for (i, (record, form)) in forms.enumerate() {
        let owner = record
            .components
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| record.file.rsplit('/').next().unwrap_or(&record.file).to_string());
        let label = humanize_identifier(&owner);
        let workflow_id = format!("form-{}", i + 1);

        let mut steps: Vec<WorkflowStep> = form
            .fields
            .iter()
            .map(|field| step("Fill field", format!("Enter {}", humanize_identifier(field).to_lowercase()), &owner))
            .collect();
        let submit = form.submit_handler.clone().unwrap_or_else(|| "submit".to_string());
        steps.push(step("Submit", format!("Form submitted via {}", submit), &owner));

        let story_id = format!("story-form-{}", i + 1);
        let mut story = new_story(
            story_id,
            &format!("Complete {}", label),
            &format!("to fill in and submit the {} form", label.to_lowercase()),
            "my input is saved",
            &workflow_id,
        );
        story.acceptance_criteria = vec![
            format!("The form asks for {}", form.fields.join(", ")),
            "Submitting valid input confirms success".to_string(),
        ];
        story.technical_implementation.components = vec![owner.clone()];
        story.technical_implementation.files = vec![record.file.clone()];
        story.test_scenarios = vec!["Submit with all fields filled".to_string(), "Submit with a required field empty".to_string()];
        result.user_stories.push(story);

        result.workflows.push(Workflow {
            id: workflow_id,
            name: format!("Complete {}", label),
            description: format!("User fills in the form rendered by {}", owner),
            actor: "User".to_string(),
            trigger: format!("User opens {}", owner),
            steps,
            outcome: "Form data is submitted".to_string(),
            related_files: vec![record.file.clone()],
        });
    }
}

// =============================================================================
// Data entities and the empty-signal case
// =============================================================================

fn data_entities(data: &WorkflowAnalysisData) -> Vec<DataEntity> {
    let mut entities: BTreeMap<String, BTreeSet<&'static str>> = BTreeMap::new();
    for op in &data.data_operations {
        if let Some(entity) = &op.entity {
            entities
                .entry(capitalize_first(entity))
                .or_default()
                .insert(op.verb.as_str());
        }
    }
    entities
        .into_iter()
        .map(|(name, verbs)| DataEntity {
            description: format!("{} records accessed by the application", name),
            name,
            fields: Vec::new(),
            operations: verbs.into_iter().map(str::to_string).collect(),
        })
        .collect()
}

fn push_getting_started(result: &mut WorkflowGenerationResult, analysis: &ProjectAnalysis) {
    let entry = analysis.entry_points.first().cloned().unwrap_or_default();
    let mut steps = vec![step("Install", "Install the project dependencies".to_string(), "")];
    steps.push(step(
        "Run",
        if entry.is_empty() {
            "Start the application".to_string()
        } else {
            format!("Start the application from {}", entry)
        },
        &entry,
    ));

    result.workflows.push(Workflow {
        id: "start".to_string(),
        name: "Run the Project".to_string(),
        description: format!("Get {} running locally", analysis.name),
        actor: "Developer".to_string(),
        trigger: "Developer checks out the repository".to_string(),
        steps,
        outcome: "The application runs".to_string(),
        related_files: analysis.entry_points.iter().take(MAX_RELATED_FILES).cloned().collect(),
    });
    let mut story = new_story(
        "start".to_string(),
        "Run the project",
        "to run the project locally",
        "I can explore what it does",
        "start",
    );
    story.as_a = "developer".to_string();
    story.priority = Priority::Low;
    story.effort = Effort::Small;
    story.complexity = StoryComplexity::Simple;
    result.user_stories.push(story);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_project;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};
    use crate::workflow::extract_workflows;

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

    #[test]
    fn test_auth_signals_yield_authentication_workflow() {
        let analysis = project(&[(
            "src/auth.ts",
            "import jwt from 'jsonwebtoken';\nexport async function login(email: string, password: string) {\n  return jwt.sign({ email }, 'secret');\n}\nexport function logout() {}\n",
        )]);
        let data = extract_workflows(&analysis);
        assert!(!data.auth.is_empty());

        let result = generate_fallback(&analysis, &data);
        let auth = result.workflows.iter().find(|w| w.name == "User Authentication").unwrap();
        assert_eq!(auth.id, "WF001");
        assert!(auth.related_files.contains(&"src/auth.ts".to_string()));

        let titles: Vec<&str> = result.user_stories.iter().map(|s| s.title.as_str()).collect();
        assert!(titles.contains(&"Login"));
        assert!(result.user_stories.iter().all(|s| s.id.starts_with("US")));
        assert_eq!(result.user_stories[0].workflow_id.as_deref(), Some("WF001"));
        assert_eq!(result.capabilities[0].name, "Authentication");
        assert_eq!(result.capabilities[0].story_ids[0], "US001");
    }

    #[test]
    fn test_routes_group_into_resources() {
        let analysis = project(&[(
            "src/server.ts",
            "const app = express();\napp.get('/api/orders', list);\napp.post('/api/orders', rateLimit, create);\napp.delete('/api/orders/:id', remove);\napp.get('/api/users/:id', show);\n",
        )]);
        let data = extract_workflows(&analysis);
        let result = generate_fallback(&analysis, &data);

        let names: Vec<&str> = result.workflows.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Manage Orders", "Manage Users"]);
        let orders = &result.workflows[0];
        assert_eq!(orders.steps.len(), 3);
        assert_eq!(orders.steps[2].order, 3);

        let story = &result.user_stories[0];
        assert_eq!(story.technical_implementation.api_endpoints.len(), 3);
        assert!(story
            .acceptance_criteria
            .iter()
            .any(|c| c == "Requests pass through rateLimit"));
        assert_eq!(result.capabilities[1].story_ids, vec!["US002"]);
    }

    #[test]
    fn test_empty_signals_still_produce_a_story() {
        let analysis = project(&[("README.md", "# shop\n")]);
        let data = WorkflowAnalysisData::default();
        let result = generate_fallback(&analysis, &data);
        assert_eq!(result.workflows.len(), 1);
        assert_eq!(result.user_stories[0].id, "US001");
        assert_eq!(result.user_stories[0].as_a, "developer");
        assert!(result.project_overview.starts_with("shop is a"));
    }

    #[test]
    fn test_entities_collect_operations() {
        let analysis = project(&[(
            "src/orders.ts",
            "import { prisma } from './db';\nexport async function createOrder(data) {\n  return prisma.order.create({ data });\n}\nexport async function listOrders() {\n  return prisma.order.findMany();\n}\n",
        )]);
        let data = extract_workflows(&analysis);
        let result = generate_fallback(&analysis, &data);
        let order = result.data_entities.iter().find(|e| e.name == "Order").unwrap();
        assert_eq!(order.operations, vec!["CREATE", "READ"]);
    }
}
