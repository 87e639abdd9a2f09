//! UI component pass
//!
//! A capitalized function whose body returns markup is a component. Runs
//! after the function pass and either flags the existing record or adds
//! one the first pass could not see (e.g. `memo(...)`/`forwardRef(...)`).

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::scan::{LineIndex, find_matching_brace, find_matching_paren, next_open_brace};
use crate::types::{SymbolKind, SymbolRecord};

static COMPONENT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(export\s+(?:default\s+)?)?(const|let|var|function)\s+([A-Z][\w$]*)")
        .expect("valid regex")
});

static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z][\w.]*[\s/>]|<>").expect("valid regex"));

const SYNTHETIC_DESCRIPTION: &str = "UI component rendering markup";

/// Body of a candidate plus whether it is an arrow with an expression body
struct Candidate<'a> {
    body: &'a str,
    expression_body: bool,
}

pub fn mark_components(text: &str, lines: &LineIndex, functions: &mut Vec<SymbolRecord>) {
    for caps in COMPONENT_DECL.captures_iter(text) {
        let (Some(keyword), Some(name)) = (caps.get(2), caps.get(3)) else {
            continue;
        };
        let candidate = if keyword.as_str() == "function" {
            function_body(text, name.end())
        } else {
            assigned_body(text, name.end())
        };
        let Some(candidate) = candidate else {
            continue;
        };
        let returns = candidate.expression_body || contains_word(candidate.body, "return");
        if !returns || !MARKUP.is_match(candidate.body) {
            continue;
        }

        match functions.iter_mut().find(|f| f.name == name.as_str()) {
            Some(existing) => existing.is_component = true,
            None => {
                let mut sym = SymbolRecord::new(name.as_str(), SymbolKind::Function, lines.line_of(name.start()));
                sym.is_exported = caps.get(1).is_some();
                sym.is_component = true;
                sym.description = Some(SYNTHETIC_DESCRIPTION.to_string());
                functions.push(sym);
            }
        }
    }
    functions.sort_by_key(|f| f.line);
}

/// `function Name(...) { ... }`
fn function_body(text: &str, after_name: usize) -> Option<Candidate<'_>> {
    let open_paren = after_name + text[after_name..].find('(')?;
    let close = find_matching_paren(text, open_paren)?;
    let open = next_open_brace(text, close + 1)?;
    let end = find_matching_brace(text, open)?;
    Some(Candidate {
        body: &text[open + 1..end],
        expression_body: false,
    })
}

/// `const Name = ...` in its arrow, function-expression and wrapper forms
fn assigned_body(text: &str, after_name: usize) -> Option<Candidate<'_>> {
    let eq = after_name + find_assignment(&text[after_name..])?;
    let value_start = eq + 1 + leading_ws(&text[eq + 1..]);
    let mut value = &text[value_start..];
    let mut base = value_start;
    if let Some(rest) = value.strip_prefix("async") {
        let skip = 5 + leading_ws(rest);
        value = &value[skip..];
        base += skip;
    }

    if value.starts_with("function") {
        return function_body(text, base + "function".len());
    }

    if value.starts_with('(') {
        let close = find_matching_paren(text, base)?;
        let after = &text[close + 1..];
        return match arrow_offset(after) {
            Some(arrow) => arrow_body(text, close + 1 + arrow + 2),
            None => None,
        };
    }

    // `props => ...`
    let ident_len = value
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(value.len());
    let after_ident = value[ident_len..].trim_start();
    if ident_len > 0 && after_ident.starts_with("=>") {
        let arrow = base + ident_len + (value[ident_len..].len() - after_ident.len());
        return arrow_body(text, arrow + 2);
    }

    // `memo(...)`, `React.forwardRef(...)`, `observer(...)`: inspect the call
    let paren = value.find(['(', ';', '\n'])?;
    if value.as_bytes()[paren] != b'(' {
        return None;
    }
    let open = base + paren;
    let close = find_matching_paren(text, open)?;
    let inner = &text[open + 1..close];
    Some(Candidate {
        body: inner,
        expression_body: inner.contains("=>"),
    })
}

fn arrow_body(text: &str, after_arrow: usize) -> Option<Candidate<'_>> {
    let start = after_arrow + leading_ws(text.get(after_arrow..)?);
    match text.as_bytes().get(start)? {
        b'{' => {
            let end = find_matching_brace(text, start)?;
            Some(Candidate {
                body: &text[start + 1..end],
                expression_body: false,
            })
        }
        b'(' => {
            let end = find_matching_paren(text, start)?;
            Some(Candidate {
                body: &text[start + 1..end],
                expression_body: true,
            })
        }
        _ => {
            let end = text[start..]
                .find([';', '\n'])
                .map(|i| start + i)
                .unwrap_or(text.len());
            Some(Candidate {
                body: &text[start..end],
                expression_body: true,
            })
        }
    }
}

/// Offset of `=>` if it directly follows the params (optionally after `: Type`)
fn arrow_offset(after_params: &str) -> Option<usize> {
    let trimmed = after_params.trim_start();
    let skipped = after_params.len() - trimmed.len();
    if trimmed.starts_with("=>") {
        return Some(skipped);
    }
    if trimmed.starts_with(':') {
        let arrow = trimmed.find("=>")?;
        let stop = trimmed.find([';', '\n', '{']).unwrap_or(trimmed.len());
        return (arrow < stop).then_some(skipped + arrow);
    }
    None
}

/// First `=` that is not part of `=>`, `==` or a type annotation's generics
fn find_assignment(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut depth = 0i32;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'<' => depth += 1,
            b'>' if i > 0 && bytes[i - 1] != b'=' => depth -= 1,
            b'=' if depth <= 0 => {
                let next = bytes.get(i + 1).copied();
                if next != Some(b'>') && next != Some(b'=') {
                    return Some(i);
                }
            }
            b';' | b'\n' | b'{' | b'(' => return None,
            _ => {}
        }
    }
    None
}

fn leading_ws(s: &str) -> usize {
    s.len() - s.trim_start().len()
}

fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(i, _)| {
        let before = haystack[..i].chars().next_back();
        let after = haystack[i + word.len()..].chars().next();
        let boundary = |c: Option<char>| c.is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        boundary(before) && boundary(after)
    })
}
