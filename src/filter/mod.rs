//! Filter & Classifier
//!
//! Marks noise nodes `ignored` and tags surviving files with a
//! `NodeCategory`. Nodes that already carry a decision are never revisited,
//! so running the filter on its own output changes nothing.

mod minified;
pub mod rules;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::FilterConfig;
use crate::types::FileNode;

pub use minified::{MinifiedThresholds, has_minified_suffix, is_minified};

/// Caller-facing filter switches
#[derive(Debug, Clone)]
pub struct FilterOptions {
    pub include_tests: bool,
    pub include_styles: bool,
    pub include_config: bool,
    /// Any path containing one of these substrings is dropped
    pub custom_excludes: Vec<String>,
    pub minified: MinifiedThresholds,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterConfig::default().into()
    }
}

impl From<FilterConfig> for FilterOptions {
    fn from(c: FilterConfig) -> Self {
        Self {
            include_tests: c.include_tests,
            include_styles: c.include_styles,
            include_config: c.include_config,
            custom_excludes: c.custom_excludes,
            minified: c.minified.into(),
        }
    }
}

/// Why a node was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DropReason {
    DeniedDirectory,
    DeniedName,
    CustomExclude,
    DeniedSuffix,
    UnsupportedExtension,
    TestFile,
    Stylesheet,
    BuildConfig,
    Minified,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::DeniedDirectory => "denied directory",
            DropReason::DeniedName => "denied file name",
            DropReason::CustomExclude => "custom exclude",
            DropReason::DeniedSuffix => "denied suffix",
            DropReason::UnsupportedExtension => "unsupported extension",
            DropReason::TestFile => "test file",
            DropReason::Stylesheet => "stylesheet",
            DropReason::BuildConfig => "build config",
            DropReason::Minified => "minified",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub kept_files: usize,
    /// Files dropped in this pass (including those under denied directories)
    pub ignored_files: usize,
    pub ignored_dirs: usize,
    pub reasons: BTreeMap<DropReason, usize>,
}

impl FilterReport {
    fn drop(&mut self, reason: DropReason) {
        *self.reasons.entry(reason).or_default() += 1;
    }
}

/// Decide whether a file is noise. `None` means keep.
pub fn file_drop_reason(path: &str, name: &str, content: &str, opts: &FilterOptions) -> Option<DropReason> {
    if rules::is_denied_file_name(name) {
        return Some(DropReason::DeniedName);
    }
    if opts
        .custom_excludes
        .iter()
        .any(|pattern| !pattern.is_empty() && path.contains(pattern.as_str()))
    {
        return Some(DropReason::CustomExclude);
    }
    if rules::has_denied_suffix(name) {
        return Some(DropReason::DeniedSuffix);
    }
    if !rules::is_allowed_extension(name) {
        return Some(DropReason::UnsupportedExtension);
    }
    if !opts.include_tests && rules::is_test_file(path) {
        return Some(DropReason::TestFile);
    }
    if !opts.include_styles && rules::is_style_file(name) {
        return Some(DropReason::Stylesheet);
    }
    if !opts.include_config && rules::is_build_config_file(name) {
        return Some(DropReason::BuildConfig);
    }
    if rules::is_code_extension(name) && is_minified(name, content, &opts.minified) {
        return Some(DropReason::Minified);
    }
    None
}

/// Apply the filter in place
pub fn apply_filters(root: &mut FileNode, opts: &FilterOptions) -> FilterReport {
    let mut report = FilterReport::default();
    for child in &mut root.children {
        visit(child, opts, &mut report);
    }
    info!(
        "Filter: kept {} files, ignored {} files and {} directories",
        report.kept_files, report.ignored_files, report.ignored_dirs
    );
    report
}

fn visit(node: &mut FileNode, opts: &FilterOptions, report: &mut FilterReport) {
    if node.ignored {
        return;
    }

    if node.is_dir() {
        if rules::is_denied_dir(&node.name) {
            debug!("Ignoring directory {}", node.path);
            let (files, dirs) = mark_ignored(node);
            report.ignored_files += files;
            report.ignored_dirs += dirs;
            report.drop(DropReason::DeniedDirectory);
            return;
        }
        for child in &mut node.children {
            visit(child, opts, report);
        }
        return;
    }

    if node.category.is_some() {
        report.kept_files += 1;
        return;
    }

    match file_drop_reason(&node.path, &node.name, &node.content, opts) {
        Some(reason) => {
            debug!("Ignoring {} ({})", node.path, reason.as_str());
            node.ignored = true;
            report.ignored_files += 1;
            report.drop(reason);
        }
        None => {
            node.category = Some(rules::categorize(&node.name));
            report.kept_files += 1;
        }
    }
}

/// Mark a whole subtree ignored; returns newly ignored (files, dirs)
fn mark_ignored(node: &mut FileNode) -> (usize, usize) {
    let mut counts = if node.ignored {
        (0, 0)
    } else if node.is_dir() {
        (0, 1)
    } else {
        (1, 0)
    };
    node.ignored = true;
    for child in &mut node.children {
        let (f, d) = mark_ignored(child);
        counts.0 += f;
        counts.1 += d;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{RawFile, ingest_files};
    use crate::types::NodeCategory;
    use proptest::prelude::*;

    fn tree(files: &[(&str, &str)]) -> FileNode {
        ingest_files(
            "demo",
            files
                .iter()
                .map(|(p, c)| RawFile::new(*p, c.as_bytes().to_vec()))
                .collect(),
        )
    }

    #[test]
    fn test_denied_directory_marks_subtree() {
        let mut root = tree(&[
            ("node_modules/react/index.js", "module.exports = {}"),
            ("node_modules/react/package.json", "{}"),
            ("src/index.ts", "export const app = 1;"),
        ]);
        let report = apply_filters(&mut root, &FilterOptions::default());

        let nm = root.find("node_modules").unwrap();
        assert!(nm.ignored);
        assert!(root.find("node_modules/react/index.js").unwrap().ignored);
        assert_eq!(report.kept_files, 1);
        assert_eq!(report.ignored_files, 2);
        assert_eq!(report.ignored_dirs, 2);
        assert_eq!(
            root.find("src/index.ts").unwrap().category,
            Some(NodeCategory::Source)
        );
    }

    #[test]
    fn test_toggles() {
        let files = [
            ("src/App.test.tsx", "test('x', () => {})"),
            ("src/theme.css", "body { margin: 0; }"),
            ("vite.config.ts", "export default {}"),
            ("package.json", "{}"),
        ];

        let mut root = tree(&files);
        apply_filters(&mut root, &FilterOptions::default());
        assert!(root.find("src/App.test.tsx").unwrap().ignored);
        assert!(!root.find("src/theme.css").unwrap().ignored);
        assert!(!root.find("vite.config.ts").unwrap().ignored);

        let opts = FilterOptions {
            include_tests: true,
            include_styles: false,
            include_config: false,
            ..Default::default()
        };
        let mut root = tree(&files);
        let report = apply_filters(&mut root, &opts);
        assert!(!root.find("src/App.test.tsx").unwrap().ignored);
        assert!(root.find("src/theme.css").unwrap().ignored);
        assert!(root.find("vite.config.ts").unwrap().ignored);
        // manifests survive the build-config toggle
        assert_eq!(
            root.find("package.json").unwrap().category,
            Some(NodeCategory::Config)
        );
        assert_eq!(report.reasons.get(&DropReason::Stylesheet), Some(&1));
    }

    #[test]
    fn test_custom_excludes_and_minified() {
        let long_line = format!("var a=\"{}\";", "z".repeat(1200));
        let mut root = tree(&[
            ("src/generated/api.ts", "export const x = 1;"),
            ("src/lib.js", &long_line),
            ("README.md", "# Demo"),
        ]);
        let opts = FilterOptions {
            custom_excludes: vec!["generated/".to_string()],
            ..Default::default()
        };
        apply_filters(&mut root, &opts);
        assert!(root.find("src/generated/api.ts").unwrap().ignored);
        assert!(root.find("src/lib.js").unwrap().ignored);
        assert_eq!(
            root.find("README.md").unwrap().category,
            Some(NodeCategory::Documentation)
        );
    }

    #[test]
    fn test_second_pass_is_identity() {
        let mut root = tree(&[
            ("dist/app.js", "x"),
            ("src/a.ts", "export const a = 1;"),
            ("logo.png", ""),
        ]);
        apply_filters(&mut root, &FilterOptions::default());
        let snapshot = root.clone();
        let report = apply_filters(&mut root, &FilterOptions::default());
        assert_eq!(root, snapshot);
        assert_eq!(report.ignored_files, 0);
        assert_eq!(report.kept_files, 1);
    }

    fn path_strategy() -> impl Strategy<Value = String> {
        let segment = prop::sample::select(vec![
            "src", "dist", "node_modules", "lib", "__tests__", "components", ".next", "styles",
        ]);
        let file = prop::sample::select(vec![
            "App.tsx", "index.ts", "util.test.js", "main.py", "theme.css", "logo.png",
            "package.json", "README.md", "vite.config.ts", "bundle.min.js", "notes.txt",
            "yarn.lock", "Makefile", "data.bin",
        ]);
        (prop::collection::vec(segment, 0..3), file)
            .prop_map(|(dirs, f)| {
                let mut parts: Vec<&str> = dirs;
                parts.push(f);
                parts.join("/")
            })
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent_and_total(
            entries in prop::collection::vec((path_strategy(), "[a-z ]{0,40}"), 0..25),
            include_tests in any::<bool>(),
            include_styles in any::<bool>(),
        ) {
            let raw = entries
                .iter()
                .map(|(p, c)| RawFile::new(p.clone(), c.as_bytes().to_vec()))
                .collect();
            let mut root = ingest_files("demo", raw);
            let opts = FilterOptions { include_tests, include_styles, ..Default::default() };

            apply_filters(&mut root, &opts);
            let once = root.clone();
            apply_filters(&mut root, &opts);
            prop_assert_eq!(&root, &once);

            let mut ok = true;
            root.walk_kept(&mut |node| {
                if node.is_file() && node.category.is_none() {
                    ok = false;
                }
            });
            prop_assert!(ok);
        }
    }
}
