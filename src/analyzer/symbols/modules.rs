//! Import and export statements (ES modules, CommonJS, Python)

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::scan::{LineIndex, split_top_level};
use crate::types::{ExportKind, ExportRecord, ImportRecord};

static ES_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?ms)^[ \t]*import\s+(type\s+)?([^'";]*?)\s*from\s*['"]([^'"]+)['"]"#)
        .expect("valid regex")
});

static SIDE_EFFECT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s*['"]([^'"]+)['"]"#).expect("valid regex")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:const|let|var)\s+(\{[^}]*\}|[A-Za-z_$][\w$]*)\s*=\s*require\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("valid regex")
});

static PY_FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^from\s+([\w.]+)\s+import\s+(\([^)]*\)|[^\n#]+)").expect("valid regex")
});

static PY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^import\s+([\w., \t]+)").expect("valid regex")
});

static EXPORT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*export\s+(default\s+)?(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\s*\*?|class|const|let|var|interface|type|enum)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("valid regex")
});

static EXPORT_DEFAULT_EXPR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+default\s+([A-Za-z_$][\w$]*)").expect("valid regex")
});

static EXPORT_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*export\s+(?:type\s+)?\{([^}]*)\}(?:\s*from\s*['"]([^'"]+)['"])?"#)
        .expect("valid regex")
});

static EXPORT_ALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*export\s+\*(?:\s+as\s+([A-Za-z_$][\w$]*))?\s+from\s*['"]([^'"]+)['"]"#)
        .expect("valid regex")
});

static MODULE_EXPORTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*module\.exports\s*=\s*(\{[^}]*\}|[A-Za-z_$][\w$]*)").expect("valid regex")
});

static EXPORTS_PROP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=").expect("valid regex")
});

/// Keywords that can follow `export default` without naming anything
const DEFAULT_NON_NAMES: &[&str] = &["function", "class", "async", "abstract", "new", "await"];

// =============================================================================
// Imports
// =============================================================================

pub fn extract_script_imports(text: &str, lines: &LineIndex) -> Vec<ImportRecord> {
    let mut out = Vec::new();

    for caps in ES_IMPORT.captures_iter(text) {
        let (Some(whole), Some(clause), Some(source)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        let mut record = ImportRecord {
            source: source.as_str().to_string(),
            default_import: None,
            named: Vec::new(),
            namespace: None,
            is_type_only: caps.get(1).is_some(),
            line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
        };
        parse_import_clause(clause.as_str(), &mut record);
        out.push(record);
    }

    for caps in SIDE_EFFECT_IMPORT.captures_iter(text) {
        let (Some(whole), Some(source)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push(ImportRecord {
            source: source.as_str().to_string(),
            default_import: None,
            named: Vec::new(),
            namespace: None,
            is_type_only: false,
            line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
        });
    }

    for caps in REQUIRE.captures_iter(text) {
        let (Some(whole), Some(binding), Some(source)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let binding = binding.as_str();
        let (default_import, named) = match binding.strip_prefix('{') {
            Some(list) => (None, named_bindings(list.trim_end_matches('}'))),
            None => (Some(binding.to_string()), Vec::new()),
        };
        out.push(ImportRecord {
            source: source.as_str().to_string(),
            default_import,
            named,
            namespace: None,
            is_type_only: false,
            line: lines.line_of(whole.start() + leading_ws(whole.as_str())),
        });
    }

    out.sort_by_key(|i| i.line);
    out
}

/// `Default, { a, b as c }` / `* as ns` / `{ type T }`
fn parse_import_clause(clause: &str, record: &mut ImportRecord) {
    for part in split_top_level(clause, ',') {
        let part = part.trim();
        if let Some(list) = part.strip_prefix('{') {
            record.named.extend(named_bindings(list.trim_end_matches('}')));
        } else if let Some(ns) = part.strip_prefix('*') {
            let name = ns.trim().trim_start_matches("as").trim();
            if !name.is_empty() {
                record.namespace = Some(name.to_string());
            }
        } else if !part.is_empty() {
            record.default_import = Some(part.to_string());
        }
    }
}

/// Local names of a `{ a, b as c, type T }` list
fn named_bindings(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| {
            let item = item.trim().trim_start_matches("type ").trim();
            // `a as b` binds `b`; CommonJS `a: b` binds `b`
            let local = item
                .rsplit_once(" as ")
                .map(|(_, l)| l)
                .or_else(|| item.split_once(':').map(|(_, l)| l))
                .unwrap_or(item);
            local.trim().to_string()
        })
        .filter(|n| !n.is_empty())
        .collect()
}

pub fn extract_python_imports(text: &str, lines: &LineIndex) -> Vec<ImportRecord> {
    let mut out = Vec::new();

    for caps in PY_FROM_IMPORT.captures_iter(text) {
        let (Some(whole), Some(module), Some(names)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        let names = names.as_str().trim().trim_start_matches('(').trim_end_matches(')');
        let (named, namespace) = if names.trim() == "*" {
            (Vec::new(), Some("*".to_string()))
        } else {
            let named = names
                .split(',')
                .map(|n| {
                    let n = n.trim();
                    n.rsplit_once(" as ").map(|(_, l)| l).unwrap_or(n).trim().to_string()
                })
                .filter(|n| !n.is_empty())
                .collect();
            (named, None)
        };
        out.push(ImportRecord {
            source: module.as_str().to_string(),
            default_import: None,
            named,
            namespace,
            is_type_only: false,
            line: lines.line_of(whole.start()),
        });
    }

    for caps in PY_IMPORT.captures_iter(text) {
        let (Some(whole), Some(modules)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        for module in modules.as_str().split(',') {
            let module = module.trim();
            if module.is_empty() {
                continue;
            }
            let (source, alias) = match module.split_once(" as ") {
                Some((s, a)) => (s.trim(), a.trim()),
                None => (module, module),
            };
            out.push(ImportRecord {
                source: source.to_string(),
                default_import: Some(alias.to_string()),
                named: Vec::new(),
                namespace: None,
                is_type_only: false,
                line: lines.line_of(whole.start()),
            });
        }
    }

    out.sort_by_key(|i| i.line);
    out
}

// =============================================================================
// Exports
// =============================================================================

pub fn extract_exports(text: &str, lines: &LineIndex) -> Vec<ExportRecord> {
    let mut out = Vec::new();
    let line_of = |offset: usize, whole: &str| lines.line_of(offset + leading_ws(whole));

    for caps in EXPORT_DECL.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        out.push(ExportRecord {
            name: name.as_str().to_string(),
            kind: if caps.get(1).is_some() {
                ExportKind::Default
            } else {
                ExportKind::Named
            },
            source: None,
            line: line_of(whole.start(), whole.as_str()),
        });
    }

    for caps in EXPORT_DEFAULT_EXPR.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if DEFAULT_NON_NAMES.contains(&name.as_str()) {
            continue;
        }
        out.push(ExportRecord {
            name: name.as_str().to_string(),
            kind: ExportKind::Default,
            source: None,
            line: line_of(whole.start(), whole.as_str()),
        });
    }

    for caps in EXPORT_LIST.captures_iter(text) {
        let (Some(whole), Some(list)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let source = caps.get(2).map(|s| s.as_str().to_string());
        for item in list.as_str().split(',') {
            let item = item.trim().trim_start_matches("type ").trim();
            if item.is_empty() {
                continue;
            }
            let exported = item.rsplit_once(" as ").map(|(_, e)| e.trim()).unwrap_or(item);
            let kind = match (exported, &source) {
                ("default", _) => ExportKind::Default,
                (_, Some(_)) => ExportKind::ReExport,
                _ => ExportKind::Named,
            };
            out.push(ExportRecord {
                name: exported.to_string(),
                kind,
                source: source.clone(),
                line: line_of(whole.start(), whole.as_str()),
            });
        }
    }

    for caps in EXPORT_ALL.captures_iter(text) {
        let (Some(whole), Some(source)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        out.push(ExportRecord {
            name: caps.get(1).map(|n| n.as_str()).unwrap_or("*").to_string(),
            kind: ExportKind::All,
            source: Some(source.as_str().to_string()),
            line: line_of(whole.start(), whole.as_str()),
        });
    }

    for caps in MODULE_EXPORTS.captures_iter(text) {
        let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let line = line_of(whole.start(), whole.as_str());
        match value.as_str().strip_prefix('{') {
            Some(list) => {
                for name in list.trim_end_matches('}').split(',') {
                    let name = name.split(':').next().unwrap_or("").trim();
                    if is_identifier(name) {
                        out.push(ExportRecord {
                            name: name.to_string(),
                            kind: ExportKind::Named,
                            source: None,
                            line,
                        });
                    }
                }
            }
            None => out.push(ExportRecord {
                name: value.as_str().to_string(),
                kind: ExportKind::Default,
                source: None,
                line,
            }),
        }
    }

    for caps in EXPORTS_PROP.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push(ExportRecord {
            name: name.as_str().to_string(),
            kind: ExportKind::Named,
            source: None,
            line: line_of(whole.start(), whole.as_str()),
        });
    }

    out.sort_by_key(|e| e.line);
    out
}

/// Python has no export syntax: `__all__` wins, else public module-level names
pub fn python_exports(text: &str, public_names: &[(String, usize)]) -> Vec<ExportRecord> {
    static ALL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?ms)^__all__\s*=\s*[\[(](.*?)[\])]").expect("valid regex"));

    if let Some(list) = ALL.captures(text).and_then(|c| c.get(1)) {
        let line = text[..list.start()].matches('\n').count() + 1;
        return list
            .as_str()
            .split(',')
            .map(|n| n.trim().trim_matches(['"', '\'']).to_string())
            .filter(|n| !n.is_empty())
            .map(|name| ExportRecord {
                name,
                kind: ExportKind::Named,
                source: None,
                line,
            })
            .collect();
    }

    public_names
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, line)| ExportRecord {
            name: name.clone(),
            kind: ExportKind::Named,
            source: None,
            line: *line,
        })
        .collect()
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imports(src: &str) -> Vec<ImportRecord> {
        extract_script_imports(src, &LineIndex::new(src))
    }

    fn exports(src: &str) -> Vec<ExportRecord> {
        extract_exports(src, &LineIndex::new(src))
    }

    #[test]
    fn test_es_import_forms() {
        let src = r#"import React, { useState, useEffect as effect } from 'react';
import * as path from "path";
import type { User } from './types';
import './styles.css';
import {
  Button,
  Card,
} from '@/components/ui';
"#;
        let found = imports(src);
        assert_eq!(found.len(), 5);

        assert_eq!(found[0].default_import.as_deref(), Some("React"));
        assert_eq!(found[0].named, vec!["useState", "effect"]);
        assert_eq!(found[1].namespace.as_deref(), Some("path"));
        assert!(found[2].is_type_only);
        assert!(found[2].is_relative());
        assert_eq!(found[3].source, "./styles.css");
        assert!(found[3].named.is_empty());
        assert_eq!(found[4].named, vec!["Button", "Card"]);
        assert_eq!(found[4].line, 5);
    }

    #[test]
    fn test_require() {
        let src = "const express = require('express');\nconst { Router, json: parseJson } = require(\"express\");\n";
        let found = imports(src);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].default_import.as_deref(), Some("express"));
        assert_eq!(found[1].named, vec!["Router", "parseJson"]);
    }

    #[test]
    fn test_python_imports() {
        let src = "import os, sys as system\nfrom fastapi import FastAPI, Depends\nfrom .models import (\n    User,\n    Order as O,\n)\nfrom x import *\n";
        let found = extract_python_imports(src, &LineIndex::new(src));
        let sources: Vec<_> = found.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["os", "sys", "fastapi", ".models", "x"]);
        assert_eq!(found[1].default_import.as_deref(), Some("system"));
        assert_eq!(found[3].named, vec!["User", "O"]);
        assert_eq!(found[4].namespace.as_deref(), Some("*"));
    }

    #[test]
    fn test_export_forms() {
        let src = r#"export const api = {};
export default function App() {}
export async function load() {}
export { helper, internal as publicName };
export { default as Button, Icon } from './ui';
export * from './types';
export * as utils from './utils';
export default store;
"#;
        let found = exports(src);
        let names: Vec<_> = found.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            names,
            vec![
                ("api", ExportKind::Named),
                ("App", ExportKind::Default),
                ("load", ExportKind::Named),
                ("helper", ExportKind::Named),
                ("publicName", ExportKind::Named),
                ("Button", ExportKind::ReExport),
                ("Icon", ExportKind::ReExport),
                ("*", ExportKind::All),
                ("utils", ExportKind::All),
                ("store", ExportKind::Default),
            ]
        );
        assert_eq!(found[6].source.as_deref(), Some("./ui"));
    }

    #[test]
    fn test_commonjs_exports() {
        let src = "module.exports = { create, remove: removeItem };\nexports.version = '1';\nmodule.exports.extra = 2;\n";
        let found = exports(src);
        let names: Vec<_> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["create", "remove", "version", "extra"]);
    }

    #[test]
    fn test_python_exports() {
        let names = vec![("run".to_string(), 1), ("_private".to_string(), 4)];
        let found = python_exports("def run(): pass\n", &names);
        assert_eq!(found.len(), 1);

        let found = python_exports("__all__ = ['a', \"b\"]\n", &names);
        let listed: Vec<_> = found.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(listed, vec!["a", "b"]);
    }
}
