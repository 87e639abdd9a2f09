//! Dense, example-light variant meant to be pasted into a model context

use crate::types::{DocMetadata, FileAnalysis, ProjectAnalysis};

/// Functions listed per file before eliding
const MAX_SYMBOLS_PER_FILE: usize = 12;

pub fn generate_ai_optimized(analysis: &ProjectAnalysis) -> String {
    let metadata = DocMetadata::from_analysis(analysis);
    let summary = &analysis.architecture;
    let mut output = String::new();

    output.push_str(&format!("PROJECT {} | TYPE {}\n", analysis.name, analysis.project_type));
    output.push_str(&format!("META {}\n", metadata.compact()));
    if !summary.technologies.is_empty() {
        output.push_str(&format!("STACK {}\n", summary.technologies.join(",")));
    }
    if !summary.patterns.is_empty() {
        output.push_str(&format!("PATTERNS {}\n", summary.patterns.join(",")));
    }
    if let Some(tool) = &summary.build_tool {
        output.push_str(&format!("BUILD {}\n", tool));
    }
    if !analysis.entry_points.is_empty() {
        output.push_str(&format!("ENTRY {}\n", analysis.entry_points.join(",")));
    }

    let deps: Vec<String> = analysis
        .dependencies
        .iter()
        .map(|d| format!("{}@{}", d.name, d.version))
        .collect();
    if !deps.is_empty() {
        output.push_str(&format!("DEPS {}\n", deps.join(",")));
    }
    let dev: Vec<&str> = analysis.dev_dependencies.iter().map(|d| d.name.as_str()).collect();
    if !dev.is_empty() {
        output.push_str(&format!("DEVDEPS {}\n", dev.join(",")));
    }

    output.push_str("FILES\n");
    for file in &analysis.files {
        output.push_str(&file_line(file));
        output.push('\n');
    }
    output
}

/// `path [category/complexity] fn:a,b cls:C(m1,m2) if:I imp:x,y`
fn file_line(file: &FileAnalysis) -> String {
    let mut line = format!("{} [{}/{}]", file.path, file.category, file.complexity);

    let functions: Vec<String> = file
        .functions
        .iter()
        .take(MAX_SYMBOLS_PER_FILE)
        .map(|f| if f.is_component { format!("<{}>", f.name) } else { f.name.clone() })
        .collect();
    if !functions.is_empty() {
        line.push_str(&format!(" fn:{}", functions.join(",")));
        if file.functions.len() > MAX_SYMBOLS_PER_FILE {
            line.push_str(&format!("+{}", file.functions.len() - MAX_SYMBOLS_PER_FILE));
        }
    }

    let classes: Vec<String> = file
        .classes
        .iter()
        .map(|c| {
            let methods: Vec<&str> = c.methods.iter().map(|m| m.name.as_str()).collect();
            format!("{}({})", c.symbol.name, methods.join(","))
        })
        .collect();
    if !classes.is_empty() {
        line.push_str(&format!(" cls:{}", classes.join(",")));
    }

    let interfaces: Vec<&str> = file.interfaces.iter().map(|i| i.symbol.name.as_str()).collect();
    if !interfaces.is_empty() {
        line.push_str(&format!(" if:{}", interfaces.join(",")));
    }

    let imports: Vec<&str> = file.imports.iter().map(|i| i.source.as_str()).collect();
    if !imports.is_empty() {
        line.push_str(&format!(" imp:{}", imports.join(",")));
    }
    if let Some(framework) = file.framework {
        line.push_str(&format!(" fw:{}", framework));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_project;
    use crate::docs::generate_standard;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};

    fn project(files: &[(&str, &str)]) -> ProjectAnalysis {
        let mut root = ingest_files(
            "demo",
            files
                .iter()
                .map(|(p, c)| RawFile::new(*p, c.as_bytes().to_vec()))
                .collect(),
        );
        apply_filters(&mut root, &FilterOptions::default());
        analyze_project(&root, "demo")
    }

    fn meta_line(text: &str) -> &str {
        text.lines().find(|l| l.starts_with("META ")).unwrap()
    }

    #[test]
    fn test_metadata_matches_standard_in_either_order() {
        let analysis = project(&[
            ("package.json", r#"{"dependencies":{"react":"^18.2.0"}}"#),
            ("src/App.tsx", "export default function App() {\n  return <div>Hello</div>;\n}\n"),
            ("src/services/api.ts", "export async function loadUser(id: string) { return fetch('/u'); }\n"),
        ]);

        let ai_first = generate_ai_optimized(&analysis);
        let standard = generate_standard(&analysis);
        let ai_second = generate_ai_optimized(&analysis);

        let expected = format!("META {}", standard.metadata.compact());
        assert_eq!(meta_line(&ai_first), expected);
        assert_eq!(meta_line(&ai_second), expected);
        assert_eq!(meta_line(&standard.ai_optimized), expected);
        assert_eq!(standard.metadata.component_count, 1);
        assert_eq!(standard.metadata.service_count, 1);
    }

    #[test]
    fn test_dense_file_lines() {
        let analysis = project(&[(
            "src/App.tsx",
            "import { useState } from 'react';\nexport default function App() {\n  return <div>Hello</div>;\n}\n",
        )]);
        let text = generate_ai_optimized(&analysis);
        assert!(text.contains("src/App.tsx [component/low] fn:<App> imp:react fw:React"));
        assert!(!text.contains("DEPS"));
    }

    #[test]
    fn test_empty_project() {
        let analysis = project(&[]);
        let text = generate_ai_optimized(&analysis);
        assert_eq!(meta_line(&text), "META files=0 components=0 services=0 lines=0");
        assert!(text.ends_with("FILES\n"));
    }
}
