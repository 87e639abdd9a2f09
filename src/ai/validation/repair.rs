//! Lenient decoding and default filling for workflow generation results
//!
//! Models drift from the requested schema in small ways: snake_case keys,
//! numbers as strings, steps given as plain strings, made-up identifiers.
//! Decoding reads what it can and the repair pass normalizes the rest.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::types::{
    Capability, DataEntity, Effort, ParseWithDefault, Priority, Result, StoryComplexity,
    TechnicalImplementation, UserStory, ValidationError, ValidationErrorKind, Workflow,
    WorkflowGenerationResult, WorkflowStep, truncate_chars,
};

const DEFAULT_ACTOR: &str = "User";
const DEFAULT_PERSONA: &str = "user";
const DERIVED_TITLE_CHARS: usize = 60;

// =============================================================================
// Decoding
// =============================================================================

/// Decode a model reply into a result, rejecting schema-invalid shapes.
///
/// A reply is schema-invalid when it is not an object or when it carries
/// neither workflows nor user stories.
pub fn parse_generation_result(value: &Value) -> Result<WorkflowGenerationResult> {
    let obj = value.as_object().ok_or_else(|| {
        ValidationError::new(ValidationErrorKind::Schema, "response is not a JSON object")
    })?;

    let result = WorkflowGenerationResult {
        project_overview: text(obj, &["projectOverview", "project_overview", "overview"]),
        workflows: objects(obj, &["workflows"]).map(decode_workflow).collect(),
        user_stories: objects(obj, &["userStories", "user_stories", "stories"])
            .map(decode_story)
            .collect(),
        capabilities: objects(obj, &["capabilities"]).map(decode_capability).collect(),
        data_entities: objects(obj, &["dataEntities", "data_entities", "entities"])
            .map(decode_entity)
            .collect(),
    };

    if result.workflows.is_empty() && result.user_stories.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::MissingField,
            "response has neither workflows nor user stories",
        )
        .with_field("workflows")
        .into());
    }
    Ok(result)
}

fn decode_workflow(obj: &Map<String, Value>) -> Workflow {
    let steps = field(obj, &["steps"])
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .filter_map(|step| match step {
                    Value::Object(s) => Some(WorkflowStep {
                        order: number(s, &["order", "step"]),
                        action: text(s, &["action", "name", "title"]),
                        description: text(s, &["description", "details"]),
                        component: text(s, &["component", "file"]),
                    }),
                    Value::String(s) => Some(WorkflowStep {
                        order: 0,
                        action: s.clone(),
                        description: String::new(),
                        component: String::new(),
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    Workflow {
        id: text(obj, &["id"]),
        name: text(obj, &["name", "title"]),
        description: text(obj, &["description"]),
        actor: text(obj, &["actor"]),
        trigger: text(obj, &["trigger"]),
        steps,
        outcome: text(obj, &["outcome", "result"]),
        related_files: strings(obj, &["relatedFiles", "related_files", "files"]),
    }
}

fn decode_story(obj: &Map<String, Value>) -> UserStory {
    let technical_implementation = field(obj, &["technicalImplementation", "technical_implementation"])
        .and_then(Value::as_object)
        .map(|t| TechnicalImplementation {
            components: strings(t, &["components"]),
            api_endpoints: strings(t, &["apiEndpoints", "api_endpoints", "endpoints"]),
            data_entities: strings(t, &["dataEntities", "data_entities", "entities"]),
            files: strings(t, &["files"]),
        })
        .unwrap_or_default();

    let workflow_id = text(obj, &["workflowId", "workflow_id"]);

    UserStory {
        id: text(obj, &["id"]),
        title: text(obj, &["title", "name"]),
        as_a: text(obj, &["asA", "as_a"]),
        i_want: text(obj, &["iWant", "i_want"]),
        so_that: text(obj, &["soThat", "so_that"]),
        acceptance_criteria: strings(obj, &["acceptanceCriteria", "acceptance_criteria"]),
        priority: Priority::parse_or_default(&text(obj, &["priority"])),
        effort: Effort::parse_or_default(&text(obj, &["effort"])),
        complexity: StoryComplexity::parse_or_default(&text(obj, &["complexity"])),
        technical_implementation,
        test_scenarios: strings(obj, &["testScenarios", "test_scenarios"]),
        workflow_id: (!workflow_id.is_empty()).then_some(workflow_id),
    }
}

fn decode_capability(obj: &Map<String, Value>) -> Capability {
    Capability {
        name: text(obj, &["name", "title"]),
        description: text(obj, &["description"]),
        story_ids: strings(obj, &["storyIds", "story_ids", "stories"]),
        features: strings(obj, &["features"]),
    }
}

fn decode_entity(obj: &Map<String, Value>) -> DataEntity {
    DataEntity {
        name: text(obj, &["name"]),
        description: text(obj, &["description"]),
        fields: strings(obj, &["fields", "attributes"]),
        operations: strings(obj, &["operations"]),
    }
}

fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

fn objects<'a>(
    obj: &'a Map<String, Value>,
    keys: &[&str],
) -> impl Iterator<Item = &'a Map<String, Value>> {
    field(obj, keys)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text(obj: &Map<String, Value>, keys: &[&str]) -> String {
    field(obj, keys).and_then(scalar).unwrap_or_default()
}

fn number(obj: &Map<String, Value>, keys: &[&str]) -> u32 {
    match field(obj, keys) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// String list; objects contribute their `name`, a lone string becomes one item
fn strings(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    match field(obj, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(o) => o.get("name").and_then(scalar),
                other => scalar(other),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

// =============================================================================
// Repair
// =============================================================================

/// Normalize identifiers and fill defaults.
///
/// Workflows become `WF001..`, stories `US001..` in order of appearance;
/// story and capability references are remapped and dangling ones dropped.
/// Step orders are renumbered from 1, keeping the model's order where given.
pub fn repair_generation_result(mut result: WorkflowGenerationResult) -> WorkflowGenerationResult {
    let mut workflow_ids: HashMap<String, String> = HashMap::new();
    for (i, workflow) in result.workflows.iter_mut().enumerate() {
        let id = format!("WF{:03}", i + 1);
        if !workflow.id.is_empty() {
            workflow_ids.entry(workflow.id.clone()).or_insert_with(|| id.clone());
        }
        workflow_ids.entry(id.clone()).or_insert_with(|| id.clone());
        workflow.id = id;

        if workflow.name.is_empty() {
            workflow.name = format!("Workflow {}", i + 1);
        }
        if workflow.actor.is_empty() {
            workflow.actor = DEFAULT_ACTOR.to_string();
        }
        workflow
            .steps
            .sort_by_key(|s| if s.order == 0 { u32::MAX } else { s.order });
        for (n, step) in workflow.steps.iter_mut().enumerate() {
            step.order = n as u32 + 1;
        }
        dedup(&mut workflow.related_files);
    }

    let mut story_ids: HashMap<String, String> = HashMap::new();
    for (i, story) in result.user_stories.iter_mut().enumerate() {
        let id = format!("US{:03}", i + 1);
        if !story.id.is_empty() {
            story_ids.entry(story.id.clone()).or_insert_with(|| id.clone());
        }
        story.id = id;

        if story.as_a.is_empty() {
            story.as_a = DEFAULT_PERSONA.to_string();
        }
        if story.title.is_empty() {
            story.title = if story.i_want.is_empty() {
                format!("User story {}", i + 1)
            } else {
                truncate_chars(&story.i_want, DERIVED_TITLE_CHARS)
            };
        }
        story.workflow_id = story
            .workflow_id
            .take()
            .and_then(|old| workflow_ids.get(&old).cloned());
    }

    for capability in &mut result.capabilities {
        capability.story_ids = capability
            .story_ids
            .iter()
            .filter_map(|old| story_ids.get(old).cloned())
            .collect();
        dedup(&mut capability.story_ids);
    }

    result
}

fn dedup(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_is_schema_invalid() {
        assert!(parse_generation_result(&json!(["workflows"])).is_err());
        assert!(parse_generation_result(&json!("text")).is_err());
    }

    #[test]
    fn test_empty_object_is_schema_invalid() {
        let err = parse_generation_result(&json!({"projectOverview": "x", "workflows": []}));
        assert!(err.is_err());
    }

    #[test]
    fn test_lenient_decoding() {
        let value = json!({
            "project_overview": "Shop",
            "workflows": [{
                "name": "Checkout",
                "steps": ["Open cart", {"order": "2", "action": "Pay"}],
                "relatedFiles": "src/cart.ts"
            }],
            "userStories": [{
                "title": "Pay",
                "as_a": "shopper",
                "priority": "HIGH",
                "effort": "enormous",
                "acceptanceCriteria": ["Card charged", 42],
                "technicalImplementation": {"apiEndpoints": ["POST /pay"]}
            }],
            "dataEntities": [{"name": "Order", "fields": [{"name": "total"}, "status"]}]
        });
        let result = parse_generation_result(&value).unwrap();
        assert_eq!(result.project_overview, "Shop");
        assert_eq!(result.workflows[0].steps.len(), 2);
        assert_eq!(result.workflows[0].steps[1].order, 2);
        assert_eq!(result.workflows[0].related_files, vec!["src/cart.ts"]);

        let story = &result.user_stories[0];
        assert_eq!(story.as_a, "shopper");
        assert_eq!(story.priority, Priority::High);
        assert_eq!(story.effort, Effort::Medium);
        assert_eq!(story.complexity, StoryComplexity::Medium);
        assert_eq!(story.acceptance_criteria, vec!["Card charged", "42"]);
        assert_eq!(story.technical_implementation.api_endpoints, vec!["POST /pay"]);
        assert!(story.test_scenarios.is_empty());
        assert_eq!(result.data_entities[0].fields, vec!["total", "status"]);
    }

    #[test]
    fn test_story_ids_are_sequential_and_references_follow() {
        let value = json!({
            "workflows": [{"id": "checkout-flow", "name": "Checkout", "steps": []}],
            "userStories": [
                {"id": "story-a", "title": "A", "workflowId": "checkout-flow"},
                {"title": "B"},
                {"id": "7", "iWant": "to see my order history", "workflowId": "missing"}
            ],
            "capabilities": [
                {"name": "Orders", "storyIds": ["story-a", "7", "ghost", "7"]}
            ]
        });
        let result = repair_generation_result(parse_generation_result(&value).unwrap());

        let ids: Vec<&str> = result.user_stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["US001", "US002", "US003"]);
        assert_eq!(result.workflows[0].id, "WF001");
        assert_eq!(result.user_stories[0].workflow_id.as_deref(), Some("WF001"));
        assert_eq!(result.user_stories[2].workflow_id, None);
        assert_eq!(result.user_stories[2].title, "to see my order history");
        assert_eq!(result.user_stories[1].as_a, "user");
        assert_eq!(result.capabilities[0].story_ids, vec!["US001", "US003"]);
    }

    #[test]
    fn test_step_orders_renumbered() {
        let value = json!({
            "workflows": [{
                "steps": [
                    {"order": 5, "action": "third"},
                    {"action": "last"},
                    {"order": 2, "action": "first"},
                    {"order": 3, "action": "second"}
                ]
            }]
        });
        let result = repair_generation_result(parse_generation_result(&value).unwrap());
        let workflow = &result.workflows[0];
        assert_eq!(workflow.name, "Workflow 1");
        assert_eq!(workflow.actor, "User");
        let steps: Vec<(u32, &str)> = workflow
            .steps
            .iter()
            .map(|s| (s.order, s.action.as_str()))
            .collect();
        assert_eq!(steps, vec![(1, "first"), (2, "second"), (3, "third"), (4, "last")]);
    }
}
