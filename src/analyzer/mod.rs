//! Code Analyzer Module
//!
//! Turns a filtered tree into a `ProjectAnalysis`:
//! - Per-file symbol extraction (functions, classes, imports, components)
//! - Manifest parsing and dependency classification
//! - Architecture pattern and build tool detection

pub mod architecture;
pub mod dependencies;
pub mod language;
pub mod scan;
pub mod symbols;

use tracing::info;

use crate::types::{FileAnalysis, FileNode, ProjectAnalysis};

pub use dependencies::{categorize_dependency, detect_build_tool, detect_project_type, find_manifest};
pub use language::Language;
pub use symbols::analyze_file;

/// Analyze every kept, non-empty file plus the manifest.
///
/// Never fails: a missing or broken manifest yields an `unknown` project
/// type with empty dependency lists.
pub fn analyze_project(root: &FileNode, name: &str) -> ProjectAnalysis {
    let files: Vec<FileAnalysis> = root
        .kept_files()
        .into_iter()
        .filter(|node| node.category.is_some() && !node.content.is_empty())
        .map(analyze_file)
        .collect();

    let manifest = find_manifest(root);
    let (dependencies, dev_dependencies) = manifest
        .as_ref()
        .map(dependencies::dependency_records)
        .unwrap_or_default();
    let project_type = detect_project_type(manifest.as_ref());
    let entry_points = files
        .iter()
        .filter(|f| f.is_entry_point)
        .map(|f| f.path.clone())
        .collect();
    let architecture =
        architecture::summarize(manifest.as_ref(), &dependencies, &dev_dependencies, &files);

    info!(
        "Analyzed {} files ({}), {} dependencies, {} patterns",
        files.len(),
        project_type,
        dependencies.len() + dev_dependencies.len(),
        architecture.patterns.len()
    );

    ProjectAnalysis {
        name: name.to_string(),
        project_type,
        structure: root.clone(),
        files,
        dependencies,
        dev_dependencies,
        manifest,
        entry_points,
        architecture,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};
    use crate::types::Framework;

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

    #[test]
    fn test_react_two_file_project() {
        let analysis = project(&[
            ("package.json", r#"{"name":"demo","dependencies":{"react":"^18.2.0"}}"#),
            ("App.tsx", "export default function App() {\n  return <div>Hello</div>;\n}\n"),
        ]);
        assert_eq!(analysis.project_type, "React");
        let components: Vec<_> = analysis.files.iter().flat_map(|f| f.components()).collect();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "App");
    }

    #[test]
    fn test_ignored_nodes_have_no_analysis() {
        let analysis = project(&[
            ("src/index.ts", "export const main = () => 1;"),
            ("node_modules/lib/index.js", "module.exports = {};"),
            ("dist/bundle.js", "var a=1;"),
            ("src/App.test.tsx", "test('x', () => {});"),
        ]);
        let mut ignored = Vec::new();
        analysis.structure.walk(&mut |node| {
            if node.ignored {
                ignored.push(node.path.clone());
            }
        });
        assert!(!ignored.is_empty());
        for file in &analysis.files {
            assert!(!ignored.contains(&file.path), "{} was ignored", file.path);
            let node = analysis.structure.find(&file.path).unwrap();
            assert!(node.is_file());
        }
        assert_eq!(analysis.files.len(), 1);
    }

    #[test]
    fn test_empty_project() {
        let analysis = project(&[("logo.png", ""), ("node_modules/x.js", "x")]);
        assert!(analysis.files.is_empty());
        assert_eq!(analysis.project_type, "unknown");
        assert!(analysis.dependencies.is_empty());
        assert!(analysis.entry_points.is_empty());
    }

    #[test]
    fn test_broken_manifest_is_unknown() {
        let analysis = project(&[("package.json", "{ oops"), ("src/util.ts", "export const a = 1;")]);
        assert_eq!(analysis.project_type, "unknown");
        assert!(analysis.manifest.is_none());
    }

    #[test]
    fn test_framework_files_without_manifest_stay_unknown() {
        let app = "import React from 'react';\nexport default function App() {\n  return <div>Hi</div>;\n}\n";
        let missing = project(&[("src/App.tsx", app)]);
        assert_eq!(missing.files[0].framework, Some(Framework::React));
        assert_eq!(missing.project_type, "unknown");

        let broken = project(&[("package.json", "{ oops"), ("src/App.tsx", app)]);
        assert!(broken.manifest.is_none());
        assert_eq!(broken.project_type, "unknown");
    }
}
