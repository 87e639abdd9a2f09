//! Architecture Pattern Detection
//!
//! Independent, additive rules over the dependency set and extracted
//! symbols. Every matching rule contributes its pattern; nothing conflicts.

use std::collections::BTreeMap;

use crate::analyzer::language::SyntaxFamily;
use crate::types::{ArchitectureSummary, DependencyCategory, DependencyRecord, FileAnalysis, FileCategory, Manifest};

use super::dependencies::detect_build_tool;

/// Pattern rule for the registry
struct PatternRule {
    name: &'static str,
    /// Any of these dependency names triggers the rule
    dependencies: &'static [&'static str],
    /// Optional probe over the analyzed files
    files: Option<fn(&[FileAnalysis]) -> bool>,
}

const PATTERN_REGISTRY: &[PatternRule] = &[
    PatternRule {
        name: "State management",
        dependencies: &[
            "redux",
            "@reduxjs/toolkit",
            "zustand",
            "mobx",
            "pinia",
            "vuex",
            "recoil",
            "jotai",
            "xstate",
        ],
        files: None,
    },
    PatternRule {
        name: "Client-side routing",
        dependencies: &["react-router", "react-router-dom", "vue-router", "@tanstack/react-router"],
        files: None,
    },
    PatternRule {
        name: "File-system routing",
        dependencies: &["next", "nuxt", "@sveltejs/kit"],
        files: None,
    },
    PatternRule {
        name: "GraphQL API layer",
        dependencies: &["graphql", "@apollo/client", "urql", "apollo-server", "@apollo/server"],
        files: None,
    },
    PatternRule {
        name: "REST client layer",
        dependencies: &["axios", "ky", "swr", "@tanstack/react-query", "react-query"],
        files: Some(|files| {
            files
                .iter()
                .any(|f| f.imports.iter().any(|i| i.source == "axios"))
        }),
    },
    PatternRule {
        name: "ORM data layer",
        dependencies: &[
            "prisma",
            "@prisma/client",
            "mongoose",
            "sequelize",
            "typeorm",
            "drizzle-orm",
            "sqlalchemy",
            "diesel",
            "sqlx",
        ],
        files: None,
    },
    PatternRule {
        name: "REST API server",
        dependencies: &[
            "express",
            "fastify",
            "koa",
            "@nestjs/core",
            "fastapi",
            "flask",
            "djangorestframework",
            "actix-web",
            "axum",
        ],
        files: None,
    },
    PatternRule {
        name: "Hooks pattern",
        dependencies: &[],
        files: Some(|files| files.iter().any(|f| f.functions.iter().any(|s| s.is_hook()))),
    },
    PatternRule {
        name: "Component-based architecture",
        dependencies: &[],
        files: Some(|files| {
            files
                .iter()
                .any(|f| f.category == FileCategory::Component || f.components().next().is_some())
        }),
    },
    PatternRule {
        name: "Service layer",
        dependencies: &[],
        files: Some(|files| files.iter().any(|f| f.category == FileCategory::Service)),
    },
    PatternRule {
        name: "Context API",
        dependencies: &[],
        files: Some(|files| files.iter().any(|f| f.content.contains("createContext("))),
    },
    PatternRule {
        name: "Utility-first CSS",
        dependencies: &["tailwindcss", "unocss", "windicss"],
        files: None,
    },
    PatternRule {
        name: "TypeScript",
        dependencies: &["typescript"],
        files: Some(|files| files.iter().any(|f| f.language.is_typed_script())),
    },
];

pub fn detect_patterns(dependencies: &[DependencyRecord], files: &[FileAnalysis]) -> Vec<String> {
    PATTERN_REGISTRY
        .iter()
        .filter(|rule| {
            rule.dependencies
                .iter()
                .any(|d| dependencies.iter().any(|dep| dep.name.eq_ignore_ascii_case(d)))
                || rule.files.is_some_and(|probe| probe(files))
        })
        .map(|rule| rule.name.to_string())
        .collect()
}

/// Source languages by file count, then framework/UI/styling/data libraries
pub fn detect_technologies(dependencies: &[DependencyRecord], files: &[FileAnalysis]) -> Vec<String> {
    let mut languages: BTreeMap<&'static str, usize> = BTreeMap::new();
    for file in files {
        let family = file.language.family();
        if matches!(family, SyntaxFamily::Script | SyntaxFamily::Python | SyntaxFamily::Brace) {
            *languages.entry(file.language.as_str()).or_default() += 1;
        }
    }
    let mut by_count: Vec<(&str, usize)> = languages.into_iter().collect();
    by_count.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    let mut technologies: Vec<String> = by_count.into_iter().map(|(l, _)| l.to_string()).collect();
    for category in [
        DependencyCategory::Framework,
        DependencyCategory::Ui,
        DependencyCategory::Styling,
        DependencyCategory::Api,
    ] {
        for dep in dependencies.iter().filter(|d| d.category == category) {
            if !technologies.contains(&dep.name) {
                technologies.push(dep.name.clone());
            }
        }
    }
    technologies
}

pub fn summarize(
    manifest: Option<&Manifest>,
    dependencies: &[DependencyRecord],
    dev_dependencies: &[DependencyRecord],
    files: &[FileAnalysis],
) -> ArchitectureSummary {
    let all: Vec<DependencyRecord> = dependencies.iter().chain(dev_dependencies).cloned().collect();
    ArchitectureSummary {
        patterns: detect_patterns(&all, files),
        technologies: detect_technologies(dependencies, files),
        build_tool: manifest.and_then(detect_build_tool),
    }
}
