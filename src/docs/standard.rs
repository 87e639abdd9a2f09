//! Fixed-section standard document

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::types::{
    DependencyCategory, DependencyRecord, DocMetadata, DocSection, FileCategory, FileNode, GeneratedDoc,
    ManifestKind, ProjectAnalysis,
};

use super::ai_optimized::generate_ai_optimized;

/// Deepest directory level drawn in the structure tree
const TREE_MAX_DEPTH: usize = 4;
/// Entries drawn before the tree is elided
const TREE_MAX_ENTRIES: usize = 150;
const DATA_FLOW_MAX_EDGES: usize = 15;

type SectionRenderer = fn(&ProjectAnalysis) -> String;

const STANDARD_SECTIONS: &[(&str, &str, SectionRenderer)] = &[
    ("overview", "Overview", overview),
    ("architecture", "Architecture", architecture),
    ("structure", "Project Structure", structure),
    ("dependencies", "Dependencies", dependencies),
    ("components", "Components", components),
    ("data-flow", "Data Flow", data_flow),
    ("getting-started", "Getting Started", getting_started),
];

pub fn generate_standard(analysis: &ProjectAnalysis) -> GeneratedDoc {
    let sections: Vec<DocSection> = STANDARD_SECTIONS
        .iter()
        .map(|(id, title, render)| DocSection {
            id: id.to_string(),
            title: title.to_string(),
            content: render(analysis),
        })
        .collect();

    let title = format!("{} Documentation", analysis.name);
    let mut content = format!("# {}\n\n", title);
    for section in &sections {
        content.push_str(&format!("## {}\n\n{}\n", section.title, section.content));
    }

    let metadata = DocMetadata::from_analysis(analysis);
    info!("Generated standard document for {} ({})", analysis.name, metadata.compact());

    GeneratedDoc {
        id: Uuid::new_v4(),
        title,
        content,
        ai_optimized: generate_ai_optimized(analysis),
        sections,
        metadata,
        generated_at: Utc::now(),
    }
}

// =============================================================================
// Sections
// =============================================================================

fn overview(analysis: &ProjectAnalysis) -> String {
    let mut output = String::new();
    if let Some(description) = analysis.description() {
        output.push_str(&format!("> {}\n\n", description));
    }
    output.push_str(&format!("- **Project type:** {}\n", analysis.project_type));
    output.push_str(&format!("- **Files analyzed:** {}\n", analysis.files.len()));
    output.push_str(&format!("- **Total lines:** {}\n", analysis.total_lines()));
    if !analysis.architecture.technologies.is_empty() {
        output.push_str(&format!(
            "- **Technologies:** {}\n",
            analysis.architecture.technologies.join(", ")
        ));
    }
    if let Some(version) = analysis.manifest.as_ref().and_then(|m| m.version.as_deref()) {
        output.push_str(&format!("- **Version:** {}\n", version));
    }
    output
}

fn architecture(analysis: &ProjectAnalysis) -> String {
    let mut output = String::new();
    let summary = &analysis.architecture;

    if summary.patterns.is_empty() {
        output.push_str("No architectural patterns were detected.\n\n");
    } else {
        output.push_str("Detected patterns:\n\n");
        for pattern in &summary.patterns {
            output.push_str(&format!("- {}\n", pattern));
        }
        output.push('\n');
    }
    if let Some(tool) = &summary.build_tool {
        output.push_str(&format!("Build tool: **{}**\n\n", tool));
    }

    let breakdown = category_breakdown(analysis);
    if !breakdown.is_empty() {
        output.push_str("| Category | Files |\n|---|---|\n");
        for (category, count) in breakdown {
            output.push_str(&format!("| {} | {} |\n", category, count));
        }
    }
    output
}

fn structure(analysis: &ProjectAnalysis) -> String {
    let tree = render_tree(&analysis.structure, TREE_MAX_DEPTH, TREE_MAX_ENTRIES);
    if tree.is_empty() {
        return "The project contains no documented files.\n".to_string();
    }
    format!("```\n{}```\n", tree)
}

fn dependencies(analysis: &ProjectAnalysis) -> String {
    if analysis.dependencies.is_empty() && analysis.dev_dependencies.is_empty() {
        return "No dependencies were declared.\n".to_string();
    }
    let mut output = String::new();
    if !analysis.dependencies.is_empty() {
        output.push_str("### Runtime\n\n");
        output.push_str(&dependency_list(&analysis.dependencies));
    }
    if !analysis.dev_dependencies.is_empty() {
        output.push_str("### Development\n\n");
        output.push_str(&dependency_list(&analysis.dev_dependencies));
    }
    output
}

fn components(analysis: &ProjectAnalysis) -> String {
    let mut output = String::new();
    for file in &analysis.files {
        let found: Vec<_> = file.components().collect();
        if found.is_empty() {
            continue;
        }
        output.push_str(&format!("### `{}`\n\n", file.path));
        for component in found {
            output.push_str(&format!("- **{}**", component.name));
            if let Some(props) = component.params.first() {
                output.push_str(&format!(" (props: `{}`)", props));
            }
            if let Some(description) = &component.description {
                output.push_str(&format!(": {}", description));
            }
            output.push('\n');
        }
        output.push('\n');
    }
    if output.is_empty() {
        output.push_str("No UI components were detected.\n");
    }
    output
}

fn data_flow(analysis: &ProjectAnalysis) -> String {
    let mut output = String::new();

    if !analysis.entry_points.is_empty() {
        output.push_str(&format!(
            "Execution starts at {}.",
            analysis
                .entry_points
                .iter()
                .map(|e| format!("`{}`", e))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        output.push(' ');
    }
    let component_files = analysis.files_in(FileCategory::Component).count();
    let service_files = analysis.files_in(FileCategory::Service).count();
    match (component_files, service_files) {
        (0, 0) => {}
        (c, 0) => output.push_str(&format!("{} component files render the interface.", c)),
        (0, s) => output.push_str(&format!("{} service files hold the application logic.", s)),
        (c, s) => output.push_str(&format!(
            "{} component files render the interface and delegate work to {} service files.",
            c, s
        )),
    }
    if !output.is_empty() {
        output.push_str("\n\n");
    }

    let edges: Vec<(&str, &str)> = analysis
        .files
        .iter()
        .flat_map(|f| {
            f.imports
                .iter()
                .filter(|i| i.is_relative())
                .map(move |i| (f.path.as_str(), i.source.as_str()))
        })
        .collect();
    if edges.is_empty() {
        output.push_str("No internal module dependencies were found.\n");
        return output;
    }
    output.push_str("Internal imports:\n\n");
    for (from, to) in edges.iter().take(DATA_FLOW_MAX_EDGES) {
        output.push_str(&format!("- `{}` → `{}`\n", from, to));
    }
    if edges.len() > DATA_FLOW_MAX_EDGES {
        output.push_str(&format!("- ... and {} more\n", edges.len() - DATA_FLOW_MAX_EDGES));
    }
    output
}

fn getting_started(analysis: &ProjectAnalysis) -> String {
    let mut output = String::new();
    let Some(manifest) = &analysis.manifest else {
        output.push_str("No manifest was found; consult the project sources for setup steps.\n");
        return output;
    };

    output.push_str("```bash\n");
    for command in install_commands(manifest.kind) {
        output.push_str(&format!("{}\n", command));
    }
    output.push_str("```\n");

    if !manifest.scripts.is_empty() {
        output.push_str("\nAvailable scripts:\n\n");
        for (name, body) in &manifest.scripts {
            output.push_str(&format!("- `{}`: `{}`\n", name, body));
        }
    }
    output
}

// =============================================================================
// Shared Rendering Helpers
// =============================================================================

pub(crate) fn install_commands(kind: ManifestKind) -> &'static [&'static str] {
    match kind {
        ManifestKind::PackageJson => &["npm install", "npm run dev"],
        ManifestKind::CargoToml => &["cargo build", "cargo run"],
        ManifestKind::Requirements => &["pip install -r requirements.txt"],
        ManifestKind::PyProject => &["pip install -e ."],
        ManifestKind::GoMod => &["go mod download", "go run ."],
    }
}

/// Dependencies grouped by category, in category order
pub(crate) fn dependency_list(deps: &[DependencyRecord]) -> String {
    let mut grouped: BTreeMap<DependencyCategory, Vec<&DependencyRecord>> = BTreeMap::new();
    for dep in deps {
        grouped.entry(dep.category).or_default().push(dep);
    }
    let mut output = String::new();
    for (category, records) in grouped {
        output.push_str(&format!("**{}**\n\n", category.label()));
        for dep in records {
            output.push_str(&format!("- `{}` {}", dep.name, dep.version));
            if let Some(description) = &dep.description {
                output.push_str(&format!(": {}", description));
            }
            output.push('\n');
        }
        output.push('\n');
    }
    output
}

pub(crate) fn category_breakdown(analysis: &ProjectAnalysis) -> Vec<(FileCategory, usize)> {
    FileCategory::ALL
        .iter()
        .map(|c| (*c, analysis.files_in(*c).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Indented tree of kept nodes, directories first
pub(crate) fn render_tree(root: &FileNode, max_depth: usize, max_entries: usize) -> String {
    let mut lines = Vec::new();
    let mut children: Vec<&FileNode> = root.children.iter().filter(|c| !c.ignored).collect();
    sort_nodes(&mut children);
    for child in children {
        tree_lines(child, 0, max_depth, &mut lines);
    }

    let mut output = String::new();
    for line in lines.iter().take(max_entries) {
        output.push_str(line);
        output.push('\n');
    }
    if lines.len() > max_entries {
        output.push_str(&format!("... {} more entries\n", lines.len() - max_entries));
    }
    output
}

fn tree_lines(node: &FileNode, depth: usize, max_depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    if node.is_file() {
        lines.push(format!("{}{}", indent, node.name));
        return;
    }
    lines.push(format!("{}{}/", indent, node.name));
    if depth + 1 >= max_depth {
        return;
    }
    let mut children: Vec<&FileNode> = node.children.iter().filter(|c| !c.ignored).collect();
    sort_nodes(&mut children);
    for child in children {
        tree_lines(child, depth + 1, max_depth, lines);
    }
}

fn sort_nodes(nodes: &mut [&FileNode]) {
    nodes.sort_by(|a, b| b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze_project;
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

    fn react_project() -> ProjectAnalysis {
        project(&[
            ("package.json", r#"{"name":"demo","scripts":{"dev":"vite"},"dependencies":{"react":"^18.2.0"}}"#),
            ("App.tsx", "export default function App() {\n  return <div>Hello</div>;\n}\n"),
        ])
    }

    #[test]
    fn test_react_scenario_metadata() {
        let doc = generate_standard(&react_project());
        assert_eq!(doc.metadata.component_count, 1);
        assert_eq!(doc.metadata.file_count, 2);
        let ids: Vec<_> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["overview", "architecture", "structure", "dependencies", "components", "data-flow", "getting-started"]
        );
        assert!(doc.section("components").unwrap().content.contains("**App**"));
        assert!(doc.section("getting-started").unwrap().content.contains("npm install"));
        assert!(doc.content.starts_with("# demo Documentation"));
    }

    #[test]
    fn test_empty_project_has_zero_metadata() {
        let analysis = project(&[("node_modules/react/index.js", "module.exports = {};")]);
        let doc = generate_standard(&analysis);
        assert_eq!(doc.metadata, DocMetadata::default());
        assert!(doc.section("components").unwrap().content.contains("No UI components"));
        assert!(doc.section("structure").unwrap().content.contains("no documented files"));
    }

    #[test]
    fn test_each_run_is_a_new_document() {
        let analysis = react_project();
        let first = generate_standard(&analysis);
        let second = generate_standard(&analysis);
        assert_ne!(first.id, second.id);
        assert_eq!(first.content, second.content);
    }

    #[test]
    fn test_tree_skips_ignored_and_respects_depth() {
        let analysis = project(&[
            ("src/a/b/c/deep.ts", "export const deep = 1;"),
            ("src/index.ts", "export const main = () => 1;"),
            ("dist/out.js", "x"),
        ]);
        let tree = render_tree(&analysis.structure, 3, 100);
        assert!(tree.contains("src/"));
        assert!(tree.contains("  index.ts"));
        assert!(!tree.contains("dist"));
        assert!(!tree.contains("deep.ts"));
    }
}
