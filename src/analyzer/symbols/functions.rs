//! Function declarations, assigned function expressions and Python `def`s

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::scan::{LineIndex, find_matching_paren, split_top_level};
use crate::types::{Parameter, SymbolKind, SymbolRecord, squash_whitespace};

static FN_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(export\s+(?:default\s+)?)?(async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*(?:<[^>{(]*>)?\s*\(",
    )
    .expect("valid regex")
});

static FN_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=\n]+)?=\s*(async\s+)?(?:(function)\b\s*\*?\s*[\w$]*\s*\(|(\()|([A-Za-z_$][\w$]*)\s*=>)",
    )
    .expect("valid regex")
});

static PY_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)(async\s+)?def\s+([A-Za-z_]\w*)\s*\(").expect("valid regex")
});

/// Extract top-level and assigned functions from script-family source
pub fn extract_script_functions(text: &str, lines: &LineIndex) -> Vec<SymbolRecord> {
    let mut out = Vec::new();

    for caps in FN_DECL.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(3)) else {
            continue;
        };
        if name.as_str().len() < 2 {
            continue;
        }
        let open = whole.end() - 1;
        let Some(close) = find_matching_paren(text, open) else {
            continue;
        };

        let mut sym = SymbolRecord::new(name.as_str(), SymbolKind::Function, lines.line_of(name.start()));
        sym.is_exported = caps.get(1).is_some();
        sym.is_async = caps.get(2).is_some();
        sym.params = parse_params(&text[open + 1..close]);
        sym.return_type = return_type_before_body(&text[close + 1..]);
        sym.description = doc_comment_before(text, whole.start());
        out.push(sym);
    }

    for caps in FN_ASSIGN.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        if name.as_str().len() < 2 {
            continue;
        }

        let (params, return_type) = if caps.get(4).is_some() {
            // `= function name(...)`
            let open = whole.end() - 1;
            let Some(close) = find_matching_paren(text, open) else {
                continue;
            };
            (
                parse_params(&text[open + 1..close]),
                return_type_before_body(&text[close + 1..]),
            )
        } else if let Some(paren) = caps.get(5) {
            // `= (...) =>`; a parenthesized expression that is not an arrow is skipped
            let Some(close) = find_matching_paren(text, paren.start()) else {
                continue;
            };
            let Some(ret) = arrow_return_type(&text[close + 1..]) else {
                continue;
            };
            (parse_params(&text[paren.start() + 1..close]), ret)
        } else if let Some(single) = caps.get(6) {
            (vec![Parameter::named(single.as_str())], None)
        } else {
            continue;
        };

        let mut sym = SymbolRecord::new(name.as_str(), SymbolKind::Function, lines.line_of(name.start()));
        sym.is_exported = caps.get(1).is_some();
        sym.is_async = caps.get(3).is_some();
        sym.params = params;
        sym.return_type = return_type;
        sym.description = doc_comment_before(text, whole.start());
        out.push(sym);
    }

    out.sort_by_key(|s| s.line);
    out
}

/// Extract module-level Python `def`s (methods are handled with their class)
pub fn extract_python_functions(text: &str, lines: &LineIndex) -> Vec<SymbolRecord> {
    let mut out = Vec::new();
    for caps in PY_DEF.captures_iter(text) {
        let (Some(whole), Some(indent), Some(name)) = (caps.get(0), caps.get(1), caps.get(3)) else {
            continue;
        };
        if !indent.as_str().is_empty() || name.as_str().len() < 2 {
            continue;
        }
        let Some(sym) = python_def(text, lines, whole.end() - 1, name.as_str(), caps.get(2).is_some()) else {
            continue;
        };
        out.push(sym);
    }
    out
}

/// Build a record for a `def` whose `(` sits at `open`
pub fn python_def(text: &str, lines: &LineIndex, open: usize, name: &str, is_async: bool) -> Option<SymbolRecord> {
    let close = find_matching_paren(text, open)?;
    let mut sym = SymbolRecord::new(name, SymbolKind::Function, lines.line_of(open));
    sym.is_async = is_async;
    sym.is_exported = !name.starts_with('_');
    sym.params = parse_params(&text[open + 1..close])
        .into_iter()
        .filter(|p| p.name != "self" && p.name != "cls")
        .collect();

    let after = &text[close + 1..];
    let header_end = after.find(':').unwrap_or(0);
    let header = after[..header_end].trim();
    sym.return_type = header
        .strip_prefix("->")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    sym.description = python_docstring(&after[header_end..]);
    Some(sym)
}

// =============================================================================
// Parameters
// =============================================================================

/// Parse a raw parameter list. Destructuring patterns are kept verbatim.
pub fn parse_params(raw: &str) -> Vec<Parameter> {
    split_top_level(raw, ',')
        .into_iter()
        .filter_map(|piece| parse_param(&piece))
        .collect()
}

fn parse_param(piece: &str) -> Option<Parameter> {
    let mut piece = piece.trim();
    for modifier in ["public ", "private ", "protected ", "readonly ", "override "] {
        if let Some(rest) = piece.strip_prefix(modifier) {
            piece = rest.trim_start();
        }
    }
    if piece.is_empty() || piece == "/" || piece == "*" {
        return None;
    }

    let (binding, default_value) = match top_level_assign(piece) {
        Some(eq) => (piece[..eq].trim(), Some(piece[eq + 1..].trim().to_string())),
        None => (piece, None),
    };

    let (name_part, type_hint) = if binding.starts_with('{') || binding.starts_with('[') {
        let close_ch = if binding.starts_with('{') { '}' } else { ']' };
        match binding.rfind(close_ch) {
            Some(end) => {
                let rest = binding[end + 1..].trim();
                (
                    &binding[..=end],
                    rest.strip_prefix(':').map(|t| t.trim().to_string()),
                )
            }
            None => (binding, None),
        }
    } else {
        match binding.split_once(':') {
            Some((name, hint)) => (name.trim(), Some(hint.trim().to_string())),
            None => (binding, None),
        }
    };

    let optional_mark = name_part.ends_with('?');
    let name = squash_whitespace(name_part.trim_end_matches('?'));
    if name.is_empty() {
        return None;
    }

    Some(Parameter {
        name,
        type_hint: type_hint.filter(|t| !t.is_empty()),
        optional: optional_mark || default_value.is_some(),
        default_value: default_value.filter(|d| !d.is_empty()),
    })
}

/// Offset of a top-level `=` that is not part of `=>`, `==`, `<=`, `>=`, `!=`
fn top_level_assign(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q && (i == 0 || bytes[i - 1] != b'\\') {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' | b'`' => quote = Some(b),
            b'(' | b'[' | b'{' | b'<' => depth += 1,
            b')' | b']' | b'}' => depth -= 1,
            b'>' if i > 0 && bytes[i - 1] != b'=' => depth -= 1,
            b'=' if depth <= 0 => {
                let next = bytes.get(i + 1).copied();
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                if next != Some(b'>') && next != Some(b'=') && !matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// =============================================================================
// Return Types
// =============================================================================

/// `): Type {` → `Type`
pub fn return_type_before_body(after_params: &str) -> Option<String> {
    let trimmed = after_params.trim_start();
    let rest = trimmed.strip_prefix(':')?;
    let end = rest.find(['{', ';', '\n']).unwrap_or(rest.len());
    let hint = rest[..end].trim().trim_end_matches("=>").trim();
    (!hint.is_empty()).then(|| hint.to_string())
}

/// For `(...) =>` or `(...): T =>`. Outer `None` means "not an arrow".
fn arrow_return_type(after_params: &str) -> Option<Option<String>> {
    let trimmed = after_params.trim_start();
    if trimmed.starts_with("=>") {
        return Some(None);
    }
    let rest = trimmed.strip_prefix(':')?;
    let arrow = rest.find("=>")?;
    let stop = rest.find([';', '\n', '{']).unwrap_or(rest.len());
    if arrow > stop {
        return None;
    }
    let hint = rest[..arrow].trim();
    Some((!hint.is_empty()).then(|| hint.to_string()))
}

// =============================================================================
// Doc Comments
// =============================================================================

/// Flattened `/** */` block immediately preceding `decl_start` (decorator
/// lines in between are allowed). `@tag` lines are dropped.
pub fn doc_comment_before(text: &str, decl_start: usize) -> Option<String> {
    let mut before = text[..decl_start].trim_end();
    loop {
        let last_line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let last_line = before[last_line_start..].trim();
        if last_line.starts_with('@') && !last_line.starts_with("@*") {
            before = before[..last_line_start].trim_end();
        } else {
            break;
        }
    }
    if !before.ends_with("*/") {
        return None;
    }
    let start = before.rfind("/**")?;
    // `/**/` has no room for a body
    let block = before.get(start + 3..before.len() - 2)?;
    // stray `*/` belonging to a different comment
    if block.contains("*/") {
        return None;
    }
    flatten_doc_block(block)
}

pub fn flatten_doc_block(block: &str) -> Option<String> {
    let text = block
        .lines()
        .map(|l| l.trim().trim_start_matches('*').trim())
        .filter(|l| !l.is_empty() && !l.starts_with('@'))
        .collect::<Vec<_>>()
        .join(" ");
    (!text.is_empty()).then_some(text)
}

fn python_docstring(after_colon: &str) -> Option<String> {
    let body = after_colon.strip_prefix(':')?.trim_start();
    let quote = if body.starts_with("\"\"\"") {
        "\"\"\""
    } else if body.starts_with("'''") {
        "'''"
    } else {
        return None;
    };
    let inner = &body[3..];
    let end = inner.find(quote)?;
    let text = squash_whitespace(&inner[..end]);
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(src: &str) -> Vec<SymbolRecord> {
        extract_script_functions(src, &LineIndex::new(src))
    }

    #[test]
    fn test_function_declarations() {
        let src = r#"
/**
 * Adds two numbers.
 * @param a first
 */
export async function addNumbers(a: number, b = 2): Promise<number> {
  return a + b;
}

function x() {}
"#;
        let fns = script(src);
        assert_eq!(fns.len(), 1);
        let f = &fns[0];
        assert_eq!(f.name, "addNumbers");
        assert!(f.is_exported && f.is_async);
        assert_eq!(f.line, 6);
        assert_eq!(f.description.as_deref(), Some("Adds two numbers."));
        assert_eq!(f.return_type.as_deref(), Some("Promise<number>"));
        assert_eq!(f.params[0].type_hint.as_deref(), Some("number"));
        assert!(f.params[1].optional);
        assert_eq!(f.params[1].default_value.as_deref(), Some("2"));
    }

    #[test]
    fn test_assigned_functions() {
        let src = r#"
export const fetchUser = async (id: string): Promise<User> => {
  return api.get(id);
};
const double = n => n * 2;
const legacy = function (a, b) { return a; };
const total = (price + tax) * 2;
const Card: React.FC<Props> = ({ title, body }) => <div>{title}</div>;
"#;
        let fns = script(src);
        let names: Vec<_> = fns.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["fetchUser", "double", "legacy", "Card"]);
        assert!(fns[0].is_exported && fns[0].is_async);
        assert_eq!(fns[0].return_type.as_deref(), Some("Promise<User>"));
        assert_eq!(fns[1].params[0].name, "n");
        assert_eq!(fns[3].params[0].name, "{ title, body }");
    }

    #[test]
    fn test_parse_params_edge_cases() {
        let params = parse_params("{ a, b }: Props = {}, ...rest: string[], cb?: (e: Event) => void, private readonly svc: Service");
        assert_eq!(params.len(), 4);
        assert_eq!(params[0].name, "{ a, b }");
        assert_eq!(params[0].type_hint.as_deref(), Some("Props"));
        assert_eq!(params[0].default_value.as_deref(), Some("{}"));
        assert_eq!(params[1].name, "...rest");
        assert!(params[2].optional);
        assert_eq!(params[2].type_hint.as_deref(), Some("(e: Event) => void"));
        assert_eq!(params[3].name, "svc");
        assert!(parse_params("").is_empty());
    }

    #[test]
    fn test_python_functions() {
        let src = "def load_items(path: str, limit=10) -> list:\n    \"\"\"Load items\n    from disk.\"\"\"\n    pass\n\nclass A:\n    def method(self):\n        pass\n\nasync def _private(): pass\n";
        let fns = extract_python_functions(src, &LineIndex::new(src));
        assert_eq!(fns.len(), 2);
        assert_eq!(fns[0].name, "load_items");
        assert_eq!(fns[0].return_type.as_deref(), Some("list"));
        assert_eq!(fns[0].description.as_deref(), Some("Load items from disk."));
        assert_eq!(fns[0].params.len(), 2);
        assert!(fns[1].is_async);
        assert!(!fns[1].is_exported);
    }

    #[test]
    fn test_doc_comment_must_be_adjacent() {
        let src = "/** Orphan */\nconst value = 1;\nfunction later() {}";
        let fns = script(src);
        assert_eq!(fns[0].description, None);
    }

    #[test]
    fn test_empty_doc_block_is_ignored() {
        let fns = script("/**/\nfunction loadUser() {}\n");
        assert_eq!(fns.len(), 1);
        assert_eq!(fns[0].name, "loadUser");
        assert_eq!(fns[0].description, None);

        let fns = script("/***/\nfunction saveUser() {}\n");
        assert_eq!(fns[0].description, None);
    }
}
