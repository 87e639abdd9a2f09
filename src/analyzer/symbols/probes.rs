//! File-level probes: framework, entry point, complexity, category
//!
//! Every probe is total: no match means `None`/`false`/the default bucket.

use crate::analyzer::language::Language;
use crate::constants::complexity::*;
use crate::filter::rules;
use crate::types::{Complexity, FileCategory, FileNode, Framework, NodeCategory, SymbolRecord};

// =============================================================================
// Framework
// =============================================================================

/// Module specifier appears as an import/require target in either quote style
pub fn imports_module(content: &str, module: &str) -> bool {
    ['\'', '"'].iter().any(|q| {
        content.contains(&format!("{q}{module}{q}")) || content.contains(&format!("{q}{module}/"))
    })
}

fn python_imports(content: &str, module: &str) -> bool {
    content.contains(&format!("from {module} import"))
        || content.contains(&format!("from {module}."))
        || content.contains(&format!("import {module}"))
}

type FrameworkProbe = fn(&str, &str) -> bool;

/// Ordered probes; the first hit wins
const FRAMEWORK_PROBES: &[(Framework, FrameworkProbe)] = &[
    (Framework::NextJs, |c, p| {
        imports_module(c, "next")
            || c.contains("getServerSideProps")
            || c.contains("getStaticProps")
            || p.starts_with("app/") && (p.ends_with("/page.tsx") || p.ends_with("/layout.tsx"))
    }),
    (Framework::Nuxt, |c, _| {
        imports_module(c, "nuxt") || imports_module(c, "#app") || c.contains("defineNuxtConfig") || c.contains("useNuxtApp")
    }),
    (Framework::React, |c, _| imports_module(c, "react") || imports_module(c, "react-dom")),
    (Framework::Vue, |c, p| imports_module(c, "vue") || p.ends_with(".vue")),
    (Framework::Angular, |c, _| c.contains("'@angular/") || c.contains("\"@angular/")),
    (Framework::Svelte, |c, p| imports_module(c, "svelte") || p.ends_with(".svelte")),
    (Framework::NestJs, |c, _| c.contains("'@nestjs/") || c.contains("\"@nestjs/")),
    (Framework::Express, |c, _| imports_module(c, "express")),
    (Framework::Fastify, |c, _| imports_module(c, "fastify")),
    (Framework::Koa, |c, _| imports_module(c, "koa")),
    (Framework::Django, |c, _| python_imports(c, "django")),
    (Framework::Flask, |c, _| python_imports(c, "flask")),
    (Framework::FastApi, |c, _| python_imports(c, "fastapi")),
];

pub fn detect_framework(path: &str, content: &str) -> Option<Framework> {
    FRAMEWORK_PROBES
        .iter()
        .find(|(_, probe)| probe(content, path))
        .map(|(fw, _)| *fw)
}

// =============================================================================
// Entry Point
// =============================================================================

/// Conventional bootstrap file stems at the project root or one level below
const ENTRY_STEMS: &[&str] = &["index", "main", "app", "server"];
const ENTRY_EXTENSIONS: &[&str] = &["js", "jsx", "ts", "tsx", "mjs", "cjs", "py", "go", "rs"];
const ENTRY_FILES: &[&str] = &[
    "manage.py",
    "wsgi.py",
    "asgi.py",
    "pages/_app.tsx",
    "pages/_app.jsx",
    "pages/_app.js",
    "app/layout.tsx",
    "app/layout.jsx",
    "src/app/layout.tsx",
    "src/app.module.ts",
    "nuxt.config.ts",
];

const BOOTSTRAP_PROBES: &[&str] = &[
    "createRoot(",
    "ReactDOM.render(",
    "hydrateRoot(",
    "createApp(",
    "bootstrapApplication(",
    "platformBrowserDynamic(",
    "NestFactory.create",
    "app.listen(",
    "server.listen(",
    "if __name__ == \"__main__\"",
    "if __name__ == '__main__'",
    "func main()",
    "fn main()",
];

pub fn is_entry_point(path: &str, name: &str, content: &str) -> bool {
    let depth = path.matches('/').count();
    if ENTRY_FILES
        .iter()
        .any(|f| path == *f || (depth <= 2 && path.ends_with(&format!("/{f}"))))
    {
        return true;
    }
    let by_name = depth <= 1
        && name.split_once('.').is_some_and(|(stem, ext)| {
            ENTRY_STEMS.contains(&stem.to_ascii_lowercase().as_str()) && ENTRY_EXTENSIONS.contains(&ext)
        });
    by_name || BOOTSTRAP_PROBES.iter().any(|p| content.contains(p))
}

// =============================================================================
// Complexity
// =============================================================================

pub fn complexity_score(line_count: usize, function_count: usize, branches: usize) -> f64 {
    line_count as f64 * LINE_WEIGHT + function_count as f64 * FUNCTION_WEIGHT + branches as f64 * BRANCH_WEIGHT
}

pub fn complexity_level(score: f64) -> Complexity {
    if score < LOW_THRESHOLD {
        Complexity::Low
    } else if score < MEDIUM_THRESHOLD {
        Complexity::Medium
    } else {
        Complexity::High
    }
}

// =============================================================================
// File Category
// =============================================================================

/// What the category decision looks at besides the node itself
pub struct CategorySignals<'a> {
    pub language: Language,
    pub functions: &'a [SymbolRecord],
    pub class_names: Vec<&'a str>,
    pub interface_count: usize,
}

const SERVICE_PATH_HINTS: &[&str] = &[
    "service", "/api/", "api/", "/server/", "controller", "repository", "/store/", "/stores/",
    "/routes/", "/models/", "middleware",
];
const SERVICE_CLASS_SUFFIXES: &[&str] = &["Service", "Controller", "Repository", "Client", "Gateway"];
const UTILITY_PATH_HINTS: &[&str] = &["util", "helper", "/lib/", "lib/", "/hooks/", "/shared/", "/common/"];

/// Fixed order: test → style → config → type → component → service → utility → other
pub fn categorize_file(node: &FileNode, signals: &CategorySignals<'_>) -> FileCategory {
    let path = node.path.to_ascii_lowercase();
    let name = node.name.to_ascii_lowercase();

    if rules::is_test_file(&path) {
        return FileCategory::Test;
    }
    if node.category == Some(NodeCategory::Style) || rules::is_style_file(&name) {
        return FileCategory::Style;
    }
    if node.category == Some(NodeCategory::Config) || rules::is_build_config_file(&name) {
        return FileCategory::Config;
    }
    if node.category == Some(NodeCategory::Documentation) {
        return FileCategory::Other;
    }

    let declares_only_types =
        signals.interface_count > 0 && signals.functions.is_empty() && signals.class_names.is_empty();
    if declares_only_types
        || name.ends_with(".types.ts")
        || name == "types.ts"
        || path.contains("/types/")
        || path.starts_with("types/")
    {
        return FileCategory::Type;
    }

    let has_component = signals.functions.iter().any(|f| f.is_component);
    if has_component
        || matches!(signals.language, Language::Vue | Language::Svelte | Language::Astro)
        || path.contains("/components/")
        || path.starts_with("components/")
    {
        return FileCategory::Component;
    }

    if SERVICE_PATH_HINTS.iter().any(|h| path.contains(h))
        || signals
            .class_names
            .iter()
            .any(|c| SERVICE_CLASS_SUFFIXES.iter().any(|s| c.ends_with(s)))
    {
        return FileCategory::Service;
    }

    let only_hooks = !signals.functions.is_empty() && signals.functions.iter().all(|f| f.is_hook());
    if only_hooks || UTILITY_PATH_HINTS.iter().any(|h| path.contains(h)) {
        return FileCategory::Utility;
    }

    FileCategory::Other
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolKind;

    #[test]
    fn test_framework_order() {
        assert_eq!(
            detect_framework("pages/index.tsx", "import Link from 'next/link';\nimport React from 'react';"),
            Some(Framework::NextJs)
        );
        assert_eq!(
            detect_framework("src/App.tsx", "import { useState } from \"react\";"),
            Some(Framework::React)
        );
        assert_eq!(detect_framework("src/App.vue", "<template></template>"), Some(Framework::Vue));
        assert_eq!(
            detect_framework("src/app.module.ts", "import { Module } from '@nestjs/common';"),
            Some(Framework::NestJs)
        );
        assert_eq!(
            detect_framework("main.py", "from fastapi import FastAPI\n"),
            Some(Framework::FastApi)
        );
        assert_eq!(detect_framework("lib/math.ts", "export const add = 1;"), None);
        // a string that merely starts with the module name is not an import
        assert_eq!(detect_framework("a.ts", "const s = 'reactive';"), None);
    }

    #[test]
    fn test_entry_points() {
        assert!(is_entry_point("src/index.tsx", "index.tsx", ""));
        assert!(is_entry_point("main.py", "main.py", ""));
        assert!(!is_entry_point("src/components/Button/index.ts", "index.ts", "export * from './Button';"));
        assert!(is_entry_point("src/boot.ts", "boot.ts", "createRoot(document.getElementById('root'))"));
        assert!(is_entry_point("cli.py", "cli.py", "if __name__ == \"__main__\":\n    run()"));
        assert!(is_entry_point("pages/_app.tsx", "_app.tsx", ""));
    }

    #[test]
    fn test_complexity_thresholds() {
        assert_eq!(complexity_level(complexity_score(100, 2, 3)), Complexity::Low);
        assert_eq!(complexity_level(complexity_score(200, 5, 10)), Complexity::Medium);
        assert_eq!(complexity_level(complexity_score(300, 10, 20)), Complexity::High);
        assert_eq!(complexity_score(10, 1, 2), 1.0 + 2.0 + 3.0);
    }

    fn node(path: &str, category: NodeCategory) -> FileNode {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut n = FileNode::file(name, path, String::new());
        n.category = Some(category);
        n
    }

    #[test]
    fn test_category_order() {
        let empty = CategorySignals {
            language: Language::TypeScript,
            functions: &[],
            class_names: vec![],
            interface_count: 0,
        };
        assert_eq!(
            categorize_file(&node("src/components/Button.test.tsx", NodeCategory::Source), &empty),
            FileCategory::Test
        );
        assert_eq!(categorize_file(&node("src/theme.css", NodeCategory::Style), &empty), FileCategory::Style);
        assert_eq!(categorize_file(&node("package.json", NodeCategory::Config), &empty), FileCategory::Config);
        assert_eq!(categorize_file(&node("README.md", NodeCategory::Documentation), &empty), FileCategory::Other);
        assert_eq!(categorize_file(&node("src/types/user.ts", NodeCategory::Source), &empty), FileCategory::Type);
        assert_eq!(
            categorize_file(&node("src/services/api.ts", NodeCategory::Source), &empty),
            FileCategory::Service
        );
        assert_eq!(categorize_file(&node("src/utils/date.ts", NodeCategory::Source), &empty), FileCategory::Utility);
        assert_eq!(categorize_file(&node("src/misc.ts", NodeCategory::Source), &empty), FileCategory::Other);

        let mut component = SymbolRecord::new("Card", SymbolKind::Function, 1);
        component.is_component = true;
        let components = [component];
        let signals = CategorySignals {
            language: Language::Tsx,
            functions: &components,
            class_names: vec![],
            interface_count: 0,
        };
        // component beats service path
        assert_eq!(
            categorize_file(&node("src/services/Card.tsx", NodeCategory::Source), &signals),
            FileCategory::Component
        );
    }
}
