//! Dependency Classifier
//!
//! Manifest parsing (package.json, Cargo.toml, requirements.txt,
//! pyproject.toml, go.mod), dependency categorization, build-tool and
//! project-type detection.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::{
    DependencyCategory, DependencyRecord, FileNode, Manifest, ManifestKind,
    Result, ScribeError, ValidationError, ValidationErrorKind,
};

// =============================================================================
// Categorization
// =============================================================================

/// Exact-name lookup: (name, category, description)
const KNOWN_DEPENDENCIES: &[(&str, DependencyCategory, &str)] = &[
    // Frameworks
    ("react", DependencyCategory::Framework, "UI component library"),
    ("react-dom", DependencyCategory::Framework, "React DOM renderer"),
    ("next", DependencyCategory::Framework, "React framework with server rendering and file-system routing"),
    ("vue", DependencyCategory::Framework, "Progressive UI framework"),
    ("nuxt", DependencyCategory::Framework, "Vue framework with server rendering"),
    ("@angular/core", DependencyCategory::Framework, "Angular application framework"),
    ("svelte", DependencyCategory::Framework, "Compiler-based UI framework"),
    ("@sveltejs/kit", DependencyCategory::Framework, "Svelte application framework"),
    ("express", DependencyCategory::Framework, "Minimal Node.js web server framework"),
    ("fastify", DependencyCategory::Framework, "Low-overhead Node.js web framework"),
    ("koa", DependencyCategory::Framework, "Middleware-based Node.js web framework"),
    ("@nestjs/core", DependencyCategory::Framework, "Modular Node.js server framework"),
    ("django", DependencyCategory::Framework, "Batteries-included Python web framework"),
    ("flask", DependencyCategory::Framework, "Lightweight Python web framework"),
    ("fastapi", DependencyCategory::Framework, "Async Python API framework"),
    ("actix-web", DependencyCategory::Framework, "Rust web framework"),
    ("axum", DependencyCategory::Framework, "Rust web framework built on tower"),
    // UI
    ("@mui/material", DependencyCategory::Ui, "Material Design component library"),
    ("antd", DependencyCategory::Ui, "Enterprise UI component library"),
    ("@chakra-ui/react", DependencyCategory::Ui, "Accessible React component library"),
    ("lucide-react", DependencyCategory::Ui, "Icon set"),
    ("framer-motion", DependencyCategory::Ui, "Animation library"),
    ("react-router-dom", DependencyCategory::Ui, "Client-side routing"),
    ("vue-router", DependencyCategory::Ui, "Client-side routing for Vue"),
    // State / utility
    ("redux", DependencyCategory::Utility, "Predictable state container"),
    ("@reduxjs/toolkit", DependencyCategory::Utility, "Redux state management toolkit"),
    ("zustand", DependencyCategory::Utility, "Minimal state management"),
    ("mobx", DependencyCategory::Utility, "Observable state management"),
    ("pinia", DependencyCategory::Utility, "Vue state management"),
    ("lodash", DependencyCategory::Utility, "General utility functions"),
    ("date-fns", DependencyCategory::Utility, "Date utilities"),
    ("dayjs", DependencyCategory::Utility, "Date utilities"),
    ("zod", DependencyCategory::Utility, "Schema validation"),
    ("yup", DependencyCategory::Utility, "Schema validation"),
    ("clsx", DependencyCategory::Utility, "Class name composition"),
    ("uuid", DependencyCategory::Utility, "UUID generation"),
    ("serde", DependencyCategory::Utility, "Rust serialization framework"),
    ("tokio", DependencyCategory::Utility, "Async runtime for Rust"),
    // API & data
    ("axios", DependencyCategory::Api, "Promise-based HTTP client"),
    ("@tanstack/react-query", DependencyCategory::Api, "Server-state fetching and caching"),
    ("swr", DependencyCategory::Api, "Data fetching hooks"),
    ("@apollo/client", DependencyCategory::Api, "GraphQL client"),
    ("graphql", DependencyCategory::Api, "GraphQL implementation"),
    ("@prisma/client", DependencyCategory::Api, "Type-safe ORM client"),
    ("prisma", DependencyCategory::Api, "ORM toolkit"),
    ("mongoose", DependencyCategory::Api, "MongoDB object modeling"),
    ("sequelize", DependencyCategory::Api, "SQL ORM"),
    ("typeorm", DependencyCategory::Api, "TypeScript ORM"),
    ("@supabase/supabase-js", DependencyCategory::Api, "Supabase client"),
    ("firebase", DependencyCategory::Api, "Firebase SDK"),
    ("sqlalchemy", DependencyCategory::Api, "Python SQL toolkit and ORM"),
    ("requests", DependencyCategory::Api, "Python HTTP client"),
    ("reqwest", DependencyCategory::Api, "Rust HTTP client"),
    // Styling
    ("tailwindcss", DependencyCategory::Styling, "Utility-first CSS framework"),
    ("styled-components", DependencyCategory::Styling, "CSS-in-JS styling"),
    ("@emotion/react", DependencyCategory::Styling, "CSS-in-JS styling"),
    ("sass", DependencyCategory::Styling, "CSS preprocessor"),
    ("postcss", DependencyCategory::Styling, "CSS transformation pipeline"),
    // Testing
    ("jest", DependencyCategory::Testing, "JavaScript test runner"),
    ("vitest", DependencyCategory::Testing, "Vite-native test runner"),
    ("@testing-library/react", DependencyCategory::Testing, "React component testing utilities"),
    ("cypress", DependencyCategory::Testing, "End-to-end testing"),
    ("@playwright/test", DependencyCategory::Testing, "End-to-end testing"),
    ("pytest", DependencyCategory::Testing, "Python test framework"),
    // Build
    ("vite", DependencyCategory::Build, "Frontend build tool and dev server"),
    ("webpack", DependencyCategory::Build, "Module bundler"),
    ("typescript", DependencyCategory::Build, "Typed superset of JavaScript"),
    ("esbuild", DependencyCategory::Build, "Fast JavaScript bundler"),
    ("rollup", DependencyCategory::Build, "Module bundler"),
    ("parcel", DependencyCategory::Build, "Zero-config bundler"),
    ("eslint", DependencyCategory::Build, "JavaScript linter"),
    ("prettier", DependencyCategory::Build, "Code formatter"),
    ("@babel/core", DependencyCategory::Build, "JavaScript compiler"),
    ("react-scripts", DependencyCategory::Build, "Create React App build scripts"),
];

/// Substring inference, checked in this order after the exact table misses
const INFERENCE_RULES: &[(DependencyCategory, &[&str])] = &[
    (DependencyCategory::Ui, &["ui", "icon", "radix", "headless", "component", "motion", "chart"]),
    (DependencyCategory::Styling, &["css", "style", "tailwind", "sass", "less", "emotion"]),
    (DependencyCategory::Testing, &["test", "jest", "mock", "spec", "cypress", "playwright", "chai", "mocha"]),
    (DependencyCategory::Build, &["webpack", "vite", "rollup", "babel", "eslint", "prettier", "loader", "plugin", "@types/", "swc", "lint"]),
    (DependencyCategory::Api, &["axios", "fetch", "http", "graphql", "apollo", "query", "api", "trpc", "orm", "sql", "mongo", "redis", "prisma"]),
];

/// Category and optional description for one dependency name
pub fn categorize_dependency(name: &str) -> (DependencyCategory, Option<&'static str>) {
    let lower = name.to_ascii_lowercase();
    if let Some((_, category, description)) = KNOWN_DEPENDENCIES.iter().find(|(n, _, _)| *n == lower) {
        return (*category, Some(*description));
    }
    let inferred = INFERENCE_RULES
        .iter()
        .find(|(_, hints)| hints.iter().any(|h| lower.contains(h)))
        .map(|(category, _)| *category)
        .unwrap_or(DependencyCategory::Other);
    (inferred, None)
}

fn to_records(deps: &BTreeMap<String, String>) -> Vec<DependencyRecord> {
    deps.iter()
        .map(|(name, version)| {
            let (category, description) = categorize_dependency(name);
            DependencyRecord {
                name: name.clone(),
                version: version.clone(),
                category,
                description: description.map(str::to_string),
            }
        })
        .collect()
}

/// Runtime and development dependency records
pub fn dependency_records(manifest: &Manifest) -> (Vec<DependencyRecord>, Vec<DependencyRecord>) {
    (
        to_records(&manifest.dependencies),
        to_records(&manifest.dev_dependencies),
    )
}

// =============================================================================
// Build Tool
// =============================================================================

/// (display name, dev-dependency names, script substrings) in priority order
const BUILD_TOOLS: &[(&str, &[&str], &[&str])] = &[
    ("Vite", &["vite"], &["vite"]),
    ("Next.js", &["next"], &["next build", "next dev"]),
    ("Webpack", &["webpack"], &["webpack"]),
    ("Parcel", &["parcel"], &["parcel"]),
    ("Rollup", &["rollup"], &["rollup"]),
    ("esbuild", &["esbuild"], &["esbuild"]),
    ("Create React App", &["react-scripts"], &["react-scripts"]),
    ("Angular CLI", &["@angular/cli"], &["ng build", "ng serve"]),
    ("Vue CLI", &["@vue/cli-service"], &["vue-cli-service"]),
    ("TypeScript Compiler", &["typescript"], &["tsc"]),
];

pub fn detect_build_tool(manifest: &Manifest) -> Option<String> {
    match manifest.kind {
        ManifestKind::CargoToml => return Some("Cargo".to_string()),
        ManifestKind::GoMod => return Some("Go toolchain".to_string()),
        _ => {}
    }
    BUILD_TOOLS
        .iter()
        .find(|(_, deps, scripts)| {
            deps.iter()
                .any(|d| manifest.dev_dependencies.contains_key(*d) || manifest.dependencies.contains_key(*d))
                || manifest
                    .scripts
                    .values()
                    .any(|body| scripts.iter().any(|s| body.contains(s)))
        })
        .map(|(name, _, _)| name.to_string())
}

// =============================================================================
// Project Type
// =============================================================================

/// Dependency → project type, most specific first
const PROJECT_TYPES: &[(&str, &str)] = &[
    ("next", "Next.js"),
    ("nuxt", "Nuxt"),
    ("@angular/core", "Angular"),
    ("@sveltejs/kit", "SvelteKit"),
    ("svelte", "Svelte"),
    ("vue", "Vue"),
    ("react", "React"),
    ("@nestjs/core", "NestJS"),
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("koa", "Koa"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("actix-web", "Actix Web"),
    ("axum", "Axum"),
];

/// Project type from manifest dependencies, then manifest kind.
/// No usable manifest means `unknown`.
pub fn detect_project_type(manifest: Option<&Manifest>) -> String {
    let Some(manifest) = manifest else {
        return "unknown".to_string();
    };
    if let Some((_, label)) = PROJECT_TYPES.iter().find(|(dep, _)| manifest.has_dependency(dep)) {
        return label.to_string();
    }
    let by_kind = match manifest.kind {
        ManifestKind::CargoToml => "Rust",
        ManifestKind::Requirements | ManifestKind::PyProject => "Python",
        ManifestKind::GoMod => "Go",
        ManifestKind::PackageJson => "Node.js",
    };
    by_kind.to_string()
}

// =============================================================================
// Manifest Discovery
// =============================================================================

/// Parse the shallowest kept manifest. Unparsable manifests are skipped.
pub fn find_manifest(root: &FileNode) -> Option<Manifest> {
    let mut candidates: Vec<(&FileNode, ManifestKind)> = root
        .kept_files()
        .into_iter()
        .filter_map(|node| manifest_kind(&node.name).map(|kind| (node, kind)))
        .collect();
    candidates.sort_by_key(|(node, kind)| (node.path.matches('/').count(), *kind as u8));

    for (node, kind) in candidates {
        match parse_manifest(kind, &node.path, &node.content) {
            Ok(manifest) => {
                debug!("Using manifest {}", node.path);
                return Some(manifest);
            }
            Err(e) => warn!("Skipping manifest {}: {}", node.path, e),
        }
    }
    None
}

fn manifest_kind(name: &str) -> Option<ManifestKind> {
    match name.to_ascii_lowercase().as_str() {
        "package.json" => Some(ManifestKind::PackageJson),
        "cargo.toml" => Some(ManifestKind::CargoToml),
        "pyproject.toml" => Some(ManifestKind::PyProject),
        "requirements.txt" => Some(ManifestKind::Requirements),
        "go.mod" => Some(ManifestKind::GoMod),
        _ => None,
    }
}

pub fn parse_manifest(kind: ManifestKind, path: &str, content: &str) -> Result<Manifest> {
    match kind {
        ManifestKind::PackageJson => parse_package_json(path, content),
        ManifestKind::CargoToml => parse_cargo_toml(path, content),
        ManifestKind::PyProject => parse_pyproject(path, content),
        ManifestKind::Requirements => Ok(parse_requirements(path, content)),
        ManifestKind::GoMod => parse_go_mod(path, content),
    }
}

// =============================================================================
// Manifest Parsers
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, String>,
}

fn parse_package_json(path: &str, content: &str) -> Result<Manifest> {
    let pkg: PackageJson = serde_json::from_str(content)?;
    let mut dependencies = pkg.dependencies;
    for (name, version) in pkg.peer_dependencies {
        dependencies.entry(name).or_insert(version);
    }
    Ok(Manifest {
        kind: ManifestKind::PackageJson,
        path: path.to_string(),
        name: pkg.name,
        version: pkg.version,
        description: pkg.description,
        scripts: pkg.scripts,
        dependencies,
        dev_dependencies: pkg.dev_dependencies,
    })
}

/// `"1.0"` or `{ version = "1.0", ... }` or `{ path = ".." }`
fn toml_version(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(t) => t
            .get("version")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| t.get("path").map(|_| "path".to_string()))
            .or_else(|| t.get("git").map(|_| "git".to_string()))
            .unwrap_or_else(|| "*".to_string()),
        other => other.to_string(),
    }
}

fn toml_table_deps(table: Option<&toml::Value>) -> BTreeMap<String, String> {
    table
        .and_then(|t| t.as_table())
        .map(|t| t.iter().map(|(k, v)| (k.clone(), toml_version(v))).collect())
        .unwrap_or_default()
}

fn toml_str(value: &toml::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn parse_cargo_toml(path: &str, content: &str) -> Result<Manifest> {
    let doc: toml::Value = toml::from_str(content)?;
    let mut manifest = Manifest::empty(ManifestKind::CargoToml, path);
    if let Some(package) = doc.get("package") {
        manifest.name = toml_str(package, "name");
        manifest.version = toml_str(package, "version");
        manifest.description = toml_str(package, "description");
    }
    manifest.dependencies = toml_table_deps(doc.get("dependencies"));
    manifest.dev_dependencies = toml_table_deps(doc.get("dev-dependencies"));
    if manifest.dependencies.is_empty()
        && let Some(ws) = doc.get("workspace")
    {
        manifest.dependencies = toml_table_deps(ws.get("dependencies"));
    }
    Ok(manifest)
}

/// `name[extra]>=1.2; marker` → (`name`, `>=1.2`)
fn split_requirement(spec: &str) -> Option<(String, String)> {
    let spec = spec.split(';').next().unwrap_or("").trim();
    if spec.is_empty() {
        return None;
    }
    let name_end = spec
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_' || c == '.'))
        .unwrap_or(spec.len());
    let name = &spec[..name_end];
    if name.is_empty() {
        return None;
    }
    let rest = spec[name_end..].trim();
    let rest = match rest.strip_prefix('[') {
        Some(after) => after.split_once(']').map(|(_, v)| v).unwrap_or("").trim(),
        None => rest,
    };
    let version = if rest.is_empty() { "*" } else { rest };
    Some((name.to_ascii_lowercase(), version.to_string()))
}

fn parse_requirements(path: &str, content: &str) -> Manifest {
    let mut manifest = Manifest::empty(ManifestKind::Requirements, path);
    manifest.dependencies = content
        .lines()
        .map(|l| l.split('#').next().unwrap_or("").trim())
        .filter(|l| !l.is_empty() && !l.starts_with('-'))
        .filter_map(split_requirement)
        .collect();
    manifest
}

fn parse_pyproject(path: &str, content: &str) -> Result<Manifest> {
    let doc: toml::Value = toml::from_str(content)?;
    let mut manifest = Manifest::empty(ManifestKind::PyProject, path);

    if let Some(project) = doc.get("project") {
        manifest.name = toml_str(project, "name");
        manifest.version = toml_str(project, "version");
        manifest.description = toml_str(project, "description");
        if let Some(deps) = project.get("dependencies").and_then(|d| d.as_array()) {
            manifest.dependencies = deps
                .iter()
                .filter_map(|d| d.as_str())
                .filter_map(split_requirement)
                .collect();
        }
        if let Some(groups) = project.get("optional-dependencies").and_then(|g| g.as_table()) {
            manifest.dev_dependencies = groups
                .values()
                .filter_map(|g| g.as_array())
                .flatten()
                .filter_map(|d| d.as_str())
                .filter_map(split_requirement)
                .collect();
        }
    }

    if let Some(poetry) = doc.get("tool").and_then(|t| t.get("poetry")) {
        manifest.name = manifest.name.or_else(|| toml_str(poetry, "name"));
        manifest.version = manifest.version.or_else(|| toml_str(poetry, "version"));
        manifest.description = manifest.description.or_else(|| toml_str(poetry, "description"));
        let mut deps = toml_table_deps(poetry.get("dependencies"));
        deps.remove("python");
        manifest.dependencies.extend(deps);
        manifest
            .dev_dependencies
            .extend(toml_table_deps(poetry.get("dev-dependencies")));
        if let Some(dev) = poetry.get("group").and_then(|g| g.get("dev")) {
            manifest
                .dev_dependencies
                .extend(toml_table_deps(dev.get("dependencies")));
        }
    }
    Ok(manifest)
}

fn parse_go_mod(path: &str, content: &str) -> Result<Manifest> {
    let mut manifest = Manifest::empty(ManifestKind::GoMod, path);
    let mut in_block = false;
    for line in content.lines() {
        let line = line.split("//").next().unwrap_or("").trim();
        if let Some(module) = line.strip_prefix("module ") {
            manifest.name = Some(module.trim().to_string());
        } else if let Some(version) = line.strip_prefix("go ") {
            manifest.version = Some(version.trim().to_string());
        } else if line == "require (" {
            in_block = true;
        } else if in_block && line == ")" {
            in_block = false;
        } else {
            let entry = if in_block { Some(line) } else { line.strip_prefix("require ") };
            if let Some((name, version)) = entry.and_then(|e| e.split_once(char::is_whitespace)) {
                manifest
                    .dependencies
                    .insert(name.to_string(), version.trim().to_string());
            }
        }
    }
    if manifest.name.is_none() {
        return Err(ScribeError::Validation(
            ValidationError::new(ValidationErrorKind::MissingField, "go.mod has no module line")
                .with_field("module"),
        ));
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOptions, apply_filters};
    use crate::ingest::{RawFile, ingest_files};

    #[test]
    fn test_categorize_exact_then_inferred() {
        assert_eq!(categorize_dependency("react").0, DependencyCategory::Framework);
        assert!(categorize_dependency("react").1.is_some());
        assert_eq!(categorize_dependency("@radix-ui/react-dialog").0, DependencyCategory::Ui);
        assert_eq!(categorize_dependency("postcss-nesting").0, DependencyCategory::Styling);
        assert_eq!(categorize_dependency("ts-jest").0, DependencyCategory::Testing);
        assert_eq!(categorize_dependency("@types/node").0, DependencyCategory::Build);
        assert_eq!(categorize_dependency("ioredis").0, DependencyCategory::Api);
        assert_eq!(categorize_dependency("left-pad"), (DependencyCategory::Other, None));
    }

    #[test]
    fn test_package_json_and_build_tool() {
        let content = r#"{
            "name": "shop",
            "version": "1.2.0",
            "scripts": { "build": "tsc && webpack --mode production" },
            "dependencies": { "react": "^18.2.0" },
            "devDependencies": { "typescript": "^5.0.0" }
        }"#;
        let manifest = parse_manifest(ManifestKind::PackageJson, "package.json", content).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("shop"));
        // scripts mention webpack, which outranks the TypeScript compiler
        assert_eq!(detect_build_tool(&manifest).as_deref(), Some("Webpack"));
        assert_eq!(detect_project_type(Some(&manifest)), "React");

        let (deps, dev) = dependency_records(&manifest);
        assert_eq!(deps.len(), 1);
        assert_eq!(dev[0].category, DependencyCategory::Build);
    }

    #[test]
    fn test_cargo_and_python_manifests() {
        let cargo = "[package]\nname = \"tool\"\nversion = \"0.1.0\"\n\n[dependencies]\nserde = { version = \"1\", features = [\"derive\"] }\nlocal = { path = \"../local\" }\n\n[dev-dependencies]\ntempfile = \"3\"\n";
        let m = parse_manifest(ManifestKind::CargoToml, "Cargo.toml", cargo).unwrap();
        assert_eq!(m.dependencies.get("serde").map(String::as_str), Some("1"));
        assert_eq!(m.dependencies.get("local").map(String::as_str), Some("path"));
        assert_eq!(detect_project_type(Some(&m)), "Rust");

        let reqs = "# web\nDjango>=4.2\nrequests[socks]==2.31 ; python_version > '3.8'\n-r base.txt\n";
        let m = parse_manifest(ManifestKind::Requirements, "requirements.txt", reqs).unwrap();
        assert_eq!(m.dependencies.get("django").map(String::as_str), Some(">=4.2"));
        assert_eq!(m.dependencies.get("requests").map(String::as_str), Some("==2.31"));
        assert_eq!(detect_project_type(Some(&m)), "Django");

        let pyproject = "[project]\nname = \"api\"\ndependencies = [\"fastapi>=0.100\", \"uvicorn\"]\n";
        let m = parse_manifest(ManifestKind::PyProject, "pyproject.toml", pyproject).unwrap();
        assert_eq!(m.dependencies.len(), 2);
        assert_eq!(detect_project_type(Some(&m)), "FastAPI");
    }

    #[test]
    fn test_go_mod() {
        let gomod = "module example.com/shop\n\ngo 1.22\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\tgolang.org/x/sync v0.5.0 // indirect\n)\nrequire github.com/google/uuid v1.6.0\n";
        let m = parse_manifest(ManifestKind::GoMod, "go.mod", gomod).unwrap();
        assert_eq!(m.name.as_deref(), Some("example.com/shop"));
        assert_eq!(m.dependencies.len(), 3);
        assert!(parse_manifest(ManifestKind::GoMod, "go.mod", "garbage").is_err());
    }

    #[test]
    fn test_find_manifest_prefers_shallowest_and_skips_broken() {
        let mut root = ingest_files(
            "demo",
            vec![
                RawFile::new("package.json", b"{ not json".to_vec()),
                RawFile::new("web/package.json", br#"{"name":"web"}"#.to_vec()),
                RawFile::new("deep/nested/package.json", br#"{"name":"deep"}"#.to_vec()),
            ],
        );
        apply_filters(&mut root, &FilterOptions::default());
        let manifest = find_manifest(&root).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("web"));
    }

    #[test]
    fn test_unknown_without_manifest_or_frameworks() {
        assert_eq!(detect_project_type(None), "unknown");
    }
}
