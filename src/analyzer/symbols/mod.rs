//! Symbol Extractor
//!
//! Regex and brace-matching probes over one file's text. Every extractor is
//! total: a file that matches nothing yields empty facets, never an error.

mod classes;
mod comments;
mod components;
mod functions;
mod modules;
pub mod probes;

use tracing::debug;

use crate::analyzer::language::{Language, SyntaxFamily};
use crate::analyzer::scan::{LineIndex, count_branches};
use crate::types::{FileAnalysis, FileNode, NodeCategory};

pub use classes::{extract_classes, extract_interfaces, extract_python_classes};
pub use comments::extract_comments;
pub use components::mark_components;
pub use functions::{extract_python_functions, extract_script_functions, parse_params};
pub use modules::{extract_exports, extract_python_imports, extract_script_imports};
pub use probes::{CategorySignals, detect_framework, imports_module, is_entry_point};

/// Languages whose markup is JSX; TypeScript generics would otherwise read as tags
fn supports_jsx(language: Language) -> bool {
    matches!(language, Language::JavaScript | Language::Jsx | Language::Tsx)
}

/// Analyze one kept file. Non-source categories get empty symbol facets.
pub fn analyze_file(node: &FileNode) -> FileAnalysis {
    let language = Language::from_file_name(&node.name);
    let text = node.content.as_str();
    let lines = LineIndex::new(text);
    let line_count = text.lines().count();

    let mut analysis = FileAnalysis {
        path: node.path.clone(),
        name: node.name.clone(),
        language,
        category: crate::types::FileCategory::Other,
        functions: Vec::new(),
        classes: Vec::new(),
        interfaces: Vec::new(),
        imports: Vec::new(),
        exports: Vec::new(),
        comments: Vec::new(),
        framework: None,
        is_entry_point: false,
        complexity: Default::default(),
        complexity_score: 0.0,
        line_count,
        content: node.content.clone(),
    };

    let is_source = node.category == Some(NodeCategory::Source) && !text.is_empty();
    if is_source {
        match language.family() {
            SyntaxFamily::Script => {
                analysis.functions = extract_script_functions(text, &lines);
                analysis.classes = extract_classes(text, &lines);
                analysis.interfaces = extract_interfaces(text, &lines);
                analysis.imports = extract_script_imports(text, &lines);
                analysis.exports = extract_exports(text, &lines);
                if supports_jsx(language) {
                    mark_components(text, &lines, &mut analysis.functions);
                }
            }
            SyntaxFamily::Python => {
                analysis.functions = extract_python_functions(text, &lines);
                analysis.classes = extract_python_classes(text, &lines);
                analysis.imports = extract_python_imports(text, &lines);
                let public: Vec<(String, usize)> = analysis
                    .functions
                    .iter()
                    .map(|f| (f.name.clone(), f.line))
                    .chain(analysis.classes.iter().map(|c| (c.symbol.name.clone(), c.symbol.line)))
                    .collect();
                analysis.exports = modules::python_exports(text, &public);
            }
            SyntaxFamily::Brace | SyntaxFamily::Markup | SyntaxFamily::Data => {}
        }
        analysis.comments = extract_comments(text, &lines);
        analysis.framework = detect_framework(&node.path, text);
        analysis.is_entry_point = is_entry_point(&node.path, &node.name, text);
    }

    let function_count = analysis.functions.len()
        + analysis.classes.iter().map(|c| c.methods.len()).sum::<usize>();
    let branches = if is_source { count_branches(text) } else { 0 };
    analysis.complexity_score = probes::complexity_score(line_count, function_count, branches);
    analysis.complexity = probes::complexity_level(analysis.complexity_score);

    analysis.category = probes::categorize_file(
        node,
        &CategorySignals {
            language,
            functions: &analysis.functions,
            class_names: analysis.classes.iter().map(|c| c.symbol.name.as_str()).collect(),
            interface_count: analysis.interfaces.len(),
        },
    );

    debug!(
        "Analyzed {} ({}, {} functions, {} classes, {})",
        node.path,
        analysis.category,
        analysis.functions.len(),
        analysis.classes.len(),
        analysis.complexity
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Complexity, FileCategory, Framework};

    fn source(path: &str, content: &str) -> FileNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut node = FileNode::file(name, path, content.to_string());
        node.category = Some(NodeCategory::Source);
        node
    }

    #[test]
    fn test_react_component_file() {
        let node = source(
            "src/App.tsx",
            "import React from 'react';\n\nexport default function App() {\n  return <div>Hello</div>;\n}\n",
        );
        let analysis = analyze_file(&node);
        assert_eq!(analysis.language, Language::Tsx);
        assert_eq!(analysis.framework, Some(Framework::React));
        assert_eq!(analysis.category, FileCategory::Component);
        assert_eq!(analysis.components().count(), 1);
        assert_eq!(analysis.imports.len(), 1);
        assert_eq!(analysis.exports.len(), 1);
        assert_eq!(analysis.complexity, Complexity::Low);
    }

    #[test]
    fn test_python_module() {
        let node = source(
            "app/services/billing.py",
            "from decimal import Decimal\n\nclass Invoice:\n    def total(self):\n        return 1\n\ndef calculate_tax(amount: Decimal) -> Decimal:\n    return amount\n",
        );
        let analysis = analyze_file(&node);
        assert_eq!(analysis.functions.len(), 1);
        assert_eq!(analysis.classes.len(), 1);
        assert_eq!(analysis.classes[0].methods.len(), 1);
        assert_eq!(analysis.category, FileCategory::Service);
        let exported: Vec<_> = analysis.exports.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(exported, vec!["calculate_tax", "Invoice"]);
    }

    #[test]
    fn test_non_source_has_empty_facets() {
        let mut node = FileNode::file("package.json", "package.json", "{\"name\": \"x\"}".to_string());
        node.category = Some(NodeCategory::Config);
        let analysis = analyze_file(&node);
        assert!(!analysis.has_symbols());
        assert!(analysis.imports.is_empty());
        assert_eq!(analysis.category, FileCategory::Config);
        assert_eq!(analysis.line_count, 1);
    }

    #[test]
    fn test_generic_typescript_is_not_a_component() {
        let node = source(
            "src/lib/list.ts",
            "export function first<T>(items: Array<T>): T | undefined {\n  return items[0];\n}\n",
        );
        let analysis = analyze_file(&node);
        assert_eq!(analysis.components().count(), 0);
        assert_eq!(analysis.category, FileCategory::Utility);
    }
}
