//! Prompt Builder System
//!
//! Sectioned prompt construction: role, objectives, context, signal
//! sections, schema, and rules, rendered in insertion order.

mod workflow;

pub use workflow::{WORKFLOW_SCHEMA, build_workflow_prompt};

#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value pairs
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Code block with language
    Code { language: String, content: String },
    /// Hard rules the reply must follow
    Rules(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: &[&str]) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Add a context item, appending to the first context section
    pub fn context_item(mut self, key: &str, value: impl Into<String>) -> Self {
        let entry = (key.to_string(), value.into());
        match self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(entry),
            None => self.sections.push(PromptSection::Context(vec![entry])),
        }
        self
    }

    /// Text section with header; skipped when `content` is blank
    pub fn section(mut self, header: &str, content: &str) -> Self {
        if !content.trim().is_empty() {
            self.sections.push(PromptSection::Text {
                header: Some(header.to_string()),
                content: content.to_string(),
            });
        }
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    pub fn rules(mut self, rules: &[&str]) -> Self {
        self.sections
            .push(PromptSection::Rules(rules.iter().map(|s| s.to_string()).collect()));
        self
    }

    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str("<ROLE>\n");
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n",
                        expertise, task
                    ));
                    prompt.push_str("</ROLE>\n\n");
                }
                PromptSection::Objectives(objectives) => {
                    prompt.push_str("<OBJECTIVES>\n");
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push_str("</OBJECTIVES>\n\n");
                }
                PromptSection::Context(items) => {
                    prompt.push_str("# Context\n\n");
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(content.trim_end());
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(content.trim_end());
                    prompt.push_str("\n```\n\n");
                }
                PromptSection::Rules(rules) => {
                    prompt.push_str("<RULES>\n");
                    for rule in rules {
                        prompt.push_str(&format!("- {}\n", rule));
                    }
                    prompt.push_str("</RULES>\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_prompt() {
        let prompt = PromptBuilder::new()
            .role("product analyst", "user stories")
            .objectives(&["Find workflows", "Write stories"])
            .build();

        assert!(prompt.contains("<ROLE>"));
        assert!(prompt.contains("product analyst"));
        assert!(prompt.contains("1. Find workflows"));
        assert!(prompt.contains("2. Write stories"));
    }

    #[test]
    fn test_context_items_keep_order() {
        let prompt = PromptBuilder::new()
            .context_item("Project", "shop")
            .section("Routes", "GET /")
            .context_item("Type", "React")
            .build();

        let project = prompt.find("**Project**: shop").unwrap();
        let kind = prompt.find("**Type**: React").unwrap();
        let routes = prompt.find("# Routes").unwrap();
        assert!(project < kind && kind < routes);
    }

    #[test]
    fn test_blank_sections_are_skipped() {
        let prompt = PromptBuilder::new().section("Routes", "  \n").rules(&["JSON only"]).build();
        assert!(!prompt.contains("# Routes"));
        assert!(prompt.contains("- JSON only"));
    }
}
