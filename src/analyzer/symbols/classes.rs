//! Classes, interfaces and object-typed aliases
//!
//! The class header is found by regex; the body is bounded by brace
//! matching, then split into members at class depth 0.

use std::sync::LazyLock;

use regex::Regex;

use super::functions::{doc_comment_before, parse_params, python_def, return_type_before_body};
use crate::analyzer::scan::{LineIndex, find_matching_brace, find_matching_paren};
use crate::types::{ClassRecord, InterfaceRecord, SymbolKind, SymbolRecord, Visibility, squash_whitespace};

static CLASS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(export\s+)?(default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)(?:\s*<[^{]*?>)?(?:\s+extends\s+([A-Za-z_$][\w$.]*)(?:\s*<[^{]*?>)?)?(?:\s+implements\s+([^{]+?))?\s*\{",
    )
    .expect("valid regex")
});

static INTERFACE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(export\s+)?(?:declare\s+)?interface\s+([A-Za-z_$][\w$]*)(?:\s*<[^{]*?>)?(?:\s+extends\s+([^{]+?))?\s*\{",
    )
    .expect("valid regex")
});

static TYPE_ALIAS_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(export\s+)?type\s+([A-Za-z_$][\w$]*)(?:\s*<[^=]*?>)?\s*=\s*\{")
        .expect("valid regex")
});

static PY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^class\s+([A-Za-z_]\w*)\s*(?:\(([^)]*)\))?\s*:").expect("valid regex")
});

static PY_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]+)(async\s+)?def\s+([A-Za-z_]\w*)\s*\(").expect("valid regex")
});

static PY_CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]+)([A-Za-z_]\w*)\s*(?::\s*([^=\n]+?))?\s*=").expect("valid regex")
});

static DECORATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[\w$.]+(?:\([^)]*\))?\s*").expect("valid regex")
});

const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "else", "do", "try", "finally", "throw",
    "new", "typeof", "await", "yield", "super", "this",
];

// =============================================================================
// Member Scanner
// =============================================================================

/// One raw member: the header text and whether a `{}` body followed it
struct RawMember {
    header: String,
    offset: usize,
    has_body: bool,
}

/// Split a class/interface body at depth 0. Nested blocks are skipped
/// whole, so an object literal inside a method never leaks out as members.
fn scan_members(body: &str, base: usize) -> Vec<RawMember> {
    let bytes = body.as_bytes();
    let mut members = Vec::new();
    let mut header = String::new();
    let mut header_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = body[i..].find('\n').map(|n| i + n).unwrap_or(bytes.len());
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = body[i + 2..].find("*/").map(|n| i + 2 + n + 2).unwrap_or(bytes.len());
                continue;
            }
            b'"' | b'\'' | b'`' => {
                let end = skip_string(bytes, i);
                if header.trim().is_empty() {
                    header_start = i;
                }
                header.push_str(&body[i..end]);
                i = end;
                continue;
            }
            b'(' => {
                if header.trim().is_empty() {
                    header.clear();
                    header_start = i;
                }
                let end = find_matching_paren(body, i).map(|c| c + 1).unwrap_or(bytes.len());
                header.push_str(&body[i..end]);
                i = end;
                continue;
            }
            b'{' => {
                let end = find_matching_brace(body, i).unwrap_or(bytes.len().saturating_sub(1));
                if is_inline_literal(&header) {
                    // `state = { ... }` and `roles: Array<{ ... }>` keep going to the terminator
                    header.push_str("{…}");
                } else {
                    flush(&mut header, base + header_start, true, &mut members);
                }
                i = end + 1;
                continue;
            }
            b';' => {
                flush(&mut header, base + header_start, false, &mut members);
            }
            b',' if !angles_open(&header) => {
                flush(&mut header, base + header_start, false, &mut members);
            }
            b'\n' => {
                let trimmed = header.trim_end();
                let continues = trimmed.is_empty()
                    || trimmed.ends_with([',', '=', '(', ':', '|', '&', '.', '?'])
                    || trimmed.ends_with("=>")
                    || angles_open(trimmed)
                    || trimmed.starts_with('@') && strip_decorators(trimmed).is_empty();
                if !continues {
                    flush(&mut header, base + header_start, false, &mut members);
                } else if !header.is_empty() {
                    header.push(' ');
                }
            }
            _ => {
                if header.trim().is_empty() && !b.is_ascii_whitespace() {
                    header.clear();
                    header_start = i;
                }
                let ch_len = utf8_len(b);
                header.push_str(&body[i..(i + ch_len).min(bytes.len())]);
                i += ch_len;
                continue;
            }
        }
        i += 1;
    }
    flush(&mut header, base + header_start, false, &mut members);
    members
}

fn flush(header: &mut String, offset: usize, has_body: bool, members: &mut Vec<RawMember>) {
    let cleaned = strip_decorators(header.trim());
    if !cleaned.is_empty() {
        members.push(RawMember {
            header: cleaned,
            offset,
            has_body,
        });
    }
    header.clear();
}

/// A `{` that opens a value or type literal rather than a member body
fn is_inline_literal(header: &str) -> bool {
    let trimmed = header.trim_end();
    if trimmed.is_empty() {
        return false;
    }
    (top_level_eq(trimmed) && !trimmed.contains("=>"))
        || trimmed.ends_with([':', '<', '|', '&', ','])
        || angles_open(trimmed)
}

/// More `<` than `>` once arrows are discounted
fn angles_open(header: &str) -> bool {
    let arrows = header.matches("=>").count();
    let open = header.matches('<').count();
    let close = header.matches('>').count().saturating_sub(arrows);
    open > close
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == quote {
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}

fn strip_decorators(header: &str) -> String {
    let mut rest = header.trim();
    while let Some(m) = DECORATOR.find(rest) {
        if m.end() == 0 {
            break;
        }
        rest = rest[m.end()..].trim_start();
    }
    squash_whitespace(rest)
}

/// Header has an assignment before any parameter list
fn top_level_eq(header: &str) -> bool {
    let before_paren = header.split('(').next().unwrap_or(header);
    before_paren
        .char_indices()
        .any(|(i, c)| c == '=' && !header[i + 1..].starts_with('>'))
}

// =============================================================================
// Member Parsing
// =============================================================================

struct Modifiers {
    visibility: Option<Visibility>,
    is_static: bool,
    is_async: bool,
}

fn take_modifiers(mut header: &str) -> (Modifiers, &str) {
    let mut m = Modifiers {
        visibility: None,
        is_static: false,
        is_async: false,
    };
    loop {
        let trimmed = header.trim_start();
        let (word, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r),
            None => break,
        };
        match word {
            "public" => m.visibility = Some(Visibility::Public),
            "private" => m.visibility = Some(Visibility::Private),
            "protected" => m.visibility = Some(Visibility::Protected),
            "static" => m.is_static = true,
            "async" => m.is_async = true,
            "readonly" | "abstract" | "override" | "declare" | "get" | "set" | "*" => {}
            _ => break,
        }
        header = rest;
    }
    let header = header.trim_start().trim_start_matches('*').trim_start();
    if header.starts_with('#') {
        m.visibility = Some(Visibility::Private);
    }
    (m, header)
}

fn is_member_name(name: &str) -> bool {
    let name = name.trim_start_matches('#');
    !name.is_empty()
        && !CONTROL_KEYWORDS.contains(&name)
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Classify one class member header as method or property
fn parse_class_member(raw: &RawMember, text: &str, lines: &LineIndex) -> Option<SymbolRecord> {
    let (mods, header) = take_modifiers(&raw.header);
    let line = lines.line_of(raw.offset);

    let paren = header.find('(');
    let eq = header.find('=').filter(|&i| !header[i + 1..].starts_with('>'));

    let mut sym = match (paren, eq) {
        // `name(args): T { ... }` or abstract signature `name(args): T;`
        (Some(p), eq) if eq.is_none_or(|e| e > p) => {
            let name = header[..p].trim().trim_end_matches('?');
            let name = name.split('<').next().unwrap_or(name).trim();
            if !is_member_name(name) {
                return None;
            }
            let close = find_matching_paren(header, p)?;
            let mut sym = SymbolRecord::new(name, SymbolKind::Method, line);
            sym.params = parse_params(&header[p + 1..close]);
            sym.return_type = return_type_before_body(&header[close + 1..]);
            sym
        }
        // `name = (args) => ...` / `name = async x => ...`
        (_, Some(e)) if header[e..].contains("=>") => {
            let name = header[..e].split(':').next().unwrap_or("").trim().trim_end_matches('?');
            if !is_member_name(name) {
                return None;
            }
            let value = header[e + 1..].trim_start();
            let (is_async, value) = match value.strip_prefix("async") {
                Some(rest) if rest.starts_with([' ', '(']) => (true, rest.trim_start()),
                _ => (false, value),
            };
            let mut sym = SymbolRecord::new(name, SymbolKind::Method, line);
            sym.is_async = is_async;
            if value.starts_with('(') {
                if let Some(close) = find_matching_paren(value, 0) {
                    sym.params = parse_params(&value[1..close]);
                    let after = value[close + 1..].trim_start();
                    if let Some(ret) = after.strip_prefix(':') {
                        let ret = ret.split("=>").next().unwrap_or("").trim();
                        if !ret.is_empty() {
                            sym.return_type = Some(ret.to_string());
                        }
                    }
                }
            } else if let Some((single, _)) = value.split_once("=>") {
                sym.params = parse_params(single);
            }
            sym
        }
        // Property: `name: T = value`, `name = value`, `name;`
        _ => {
            if raw.has_body {
                return None;
            }
            let end = header.find([':', '=', '!']).unwrap_or(header.len());
            let name = header[..end].trim().trim_end_matches('?');
            if !is_member_name(name) {
                return None;
            }
            let mut sym = SymbolRecord::new(name, SymbolKind::Property, line);
            if header[end..].starts_with(':') || header[end..].starts_with("!:") {
                let type_part = header[end..].trim_start_matches('!').trim_start_matches(':');
                let type_part = type_part.split('=').next().unwrap_or("").trim();
                if !type_part.is_empty() {
                    sym.return_type = Some(type_part.to_string());
                }
            }
            sym
        }
    };

    sym.visibility = mods.visibility;
    sym.is_static = mods.is_static;
    sym.is_async = sym.is_async || mods.is_async;
    sym.description = doc_comment_before(text, line_start(text, raw.offset));
    Some(sym)
}

/// Interface members: `name?: T;` properties and `name(args): T;` signatures
fn parse_interface_member(raw: &RawMember, lines: &LineIndex) -> Option<SymbolRecord> {
    let (_, header) = take_modifiers(&raw.header);
    let line = lines.line_of(raw.offset);
    let colon = header.find(':');
    let paren = header.find('(');

    match (paren, colon) {
        (Some(p), c) if c.is_none_or(|c| c > p) => {
            let name = header[..p].trim().trim_end_matches('?');
            if !is_member_name(name) {
                return None;
            }
            let close = find_matching_paren(header, p)?;
            let mut sym = SymbolRecord::new(name, SymbolKind::Method, line);
            sym.params = parse_params(&header[p + 1..close]);
            sym.return_type = return_type_before_body(&header[close + 1..]);
            Some(sym)
        }
        (_, Some(c)) => {
            let raw_name = header[..c].trim();
            let name = raw_name.trim_end_matches('?');
            if !is_member_name(name.trim_start_matches("readonly ").trim()) {
                return None;
            }
            let mut sym = SymbolRecord::new(name, SymbolKind::Property, line);
            let hint = header[c + 1..].trim();
            sym.return_type = (!hint.is_empty()).then(|| hint.to_string());
            Some(sym)
        }
        _ => None,
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

// =============================================================================
// Extraction
// =============================================================================

pub fn extract_classes(text: &str, lines: &LineIndex) -> Vec<ClassRecord> {
    let mut out = Vec::new();
    for caps in CLASS_HEADER.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(3)) else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = find_matching_brace(text, open) else {
            continue;
        };

        let mut symbol = SymbolRecord::new(name.as_str(), SymbolKind::Class, lines.line_of(name.start()));
        symbol.is_exported = caps.get(1).is_some();
        symbol.description = doc_comment_before(text, whole.start());

        let mut methods = Vec::new();
        let mut properties = Vec::new();
        for raw in scan_members(&text[open + 1..close], open + 1) {
            let Some(member) = parse_class_member(&raw, text, lines) else {
                continue;
            };
            match member.kind {
                SymbolKind::Method => methods.push(member),
                _ => properties.push(member),
            }
        }

        out.push(ClassRecord {
            symbol,
            extends: caps.get(4).map(|m| m.as_str().to_string()),
            implements: caps
                .get(5)
                .map(|m| split_names(m.as_str()))
                .unwrap_or_default(),
            methods,
            properties,
        });
    }
    out
}

pub fn extract_interfaces(text: &str, lines: &LineIndex) -> Vec<InterfaceRecord> {
    let mut out = Vec::new();

    let headers = INTERFACE_HEADER
        .captures_iter(text)
        .map(|c| (c, SymbolKind::Interface))
        .chain(
            TYPE_ALIAS_HEADER
                .captures_iter(text)
                .map(|c| (c, SymbolKind::TypeAlias)),
        );

    for (caps, kind) in headers {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = find_matching_brace(text, open) else {
            continue;
        };

        let mut symbol = SymbolRecord::new(name.as_str(), kind, lines.line_of(name.start()));
        symbol.is_exported = caps.get(1).is_some();
        symbol.description = doc_comment_before(text, whole.start());

        let extends = match kind {
            SymbolKind::Interface => caps.get(3).map(|m| split_names(m.as_str())).unwrap_or_default(),
            _ => Vec::new(),
        };
        let members = scan_members(&text[open + 1..close], open + 1)
            .iter()
            .filter_map(|raw| parse_interface_member(raw, lines))
            .collect();

        out.push(InterfaceRecord {
            symbol,
            extends,
            members,
        });
    }
    out.sort_by_key(|i| i.symbol.line);
    out
}

/// Python classes: body is every following line indented deeper than the header
pub fn extract_python_classes(text: &str, lines: &LineIndex) -> Vec<ClassRecord> {
    let mut out = Vec::new();
    for caps in PY_CLASS.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let body_start = text[whole.end()..].find('\n').map(|i| whole.end() + i + 1).unwrap_or(text.len());
        let body_end = python_block_end(text, body_start);
        let body = &text[body_start..body_end];

        let bases = caps.get(2).map(|m| split_names(m.as_str())).unwrap_or_default();
        let mut symbol = SymbolRecord::new(name.as_str(), SymbolKind::Class, lines.line_of(name.start()));
        symbol.is_exported = !name.as_str().starts_with('_');

        let member_indent = body
            .lines()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.len() - l.trim_start().len())
            .unwrap_or(4);

        let mut methods = Vec::new();
        for m in PY_METHOD.captures_iter(body) {
            let (Some(mw), Some(indent), Some(mname)) = (m.get(0), m.get(1), m.get(3)) else {
                continue;
            };
            if indent.as_str().len() != member_indent {
                continue;
            }
            let open = body_start + mw.end() - 1;
            if let Some(mut sym) = python_def(text, lines, open, mname.as_str(), m.get(2).is_some()) {
                sym.kind = SymbolKind::Method;
                sym.visibility = Some(if mname.as_str().starts_with('_') && !mname.as_str().starts_with("__") {
                    Visibility::Private
                } else {
                    Visibility::Public
                });
                methods.push(sym);
            }
        }

        let mut properties = Vec::new();
        for a in PY_CLASS_ATTR.captures_iter(body) {
            let (Some(indent), Some(aname)) = (a.get(1), a.get(2)) else {
                continue;
            };
            if indent.as_str().len() != member_indent {
                continue;
            }
            let mut sym = SymbolRecord::new(
                aname.as_str(),
                SymbolKind::Property,
                lines.line_of(body_start + aname.start()),
            );
            sym.return_type = a.get(3).map(|t| t.as_str().trim().to_string());
            properties.push(sym);
        }

        out.push(ClassRecord {
            symbol,
            extends: bases.first().cloned(),
            implements: bases.into_iter().skip(1).collect(),
            methods,
            properties,
        });
    }
    out
}

fn python_block_end(text: &str, start: usize) -> usize {
    let mut offset = start;
    for line in text[start..].split_inclusive('\n') {
        let is_blank = line.trim().is_empty();
        let indented = line.starts_with([' ', '\t']);
        if !is_blank && !indented {
            return offset;
        }
        offset += line.len();
    }
    text.len()
}

fn split_names(list: &str) -> Vec<String> {
    crate::analyzer::scan::split_top_level(list, ',')
        .into_iter()
        .map(|s| s.split('<').next().unwrap_or(&s).trim().to_string())
        .filter(|s| !s.is_empty() && !s.contains('='))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(src: &str) -> Vec<ClassRecord> {
        extract_classes(src, &LineIndex::new(src))
    }

    #[test]
    fn test_nested_braces_bound_class_body() {
        let src = r#"
export class OrderService extends BaseService implements Auditable, Disposable {
  private readonly repo: OrderRepo;
  static instances = 0;
  config = { retries: 3, nested: { deep: true } };

  constructor(repo: OrderRepo) {
    super();
    this.repo = repo;
  }

  async createOrder(input: OrderInput): Promise<Order> {
    const payload = { items: input.items, meta: { source: "web" } };
    if (payload.items.length === 0) {
      throw new Error("empty");
    }
    return this.repo.save(payload);
  }

  handleClick = (event: MouseEvent) => {
    console.log({ event });
  };

  get total(): number { return 1; }
}

function afterClass() { return { notAMember: true }; }
"#;
        let found = classes(src);
        assert_eq!(found.len(), 1);
        let class = &found[0];
        assert_eq!(class.symbol.name, "OrderService");
        assert!(class.symbol.is_exported);
        assert_eq!(class.extends.as_deref(), Some("BaseService"));
        assert_eq!(class.implements, vec!["Auditable", "Disposable"]);

        let methods: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["constructor", "createOrder", "handleClick", "total"]);
        let props: Vec<_> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, vec!["repo", "instances", "config"]);

        let create = &class.methods[1];
        assert!(create.is_async);
        assert_eq!(create.return_type.as_deref(), Some("Promise<Order>"));
        assert_eq!(create.params[0].name, "input");
        assert_eq!(class.properties[0].visibility, Some(Visibility::Private));
        assert!(class.properties[1].is_static);
    }

    #[test]
    fn test_decorated_members() {
        let src = "@Component({ selector: 'app-root' })\nexport class AppComponent {\n  @Input() title: string;\n  @Output()\n  changed = new EventEmitter();\n  @HostListener('click', ['$event'])\n  onClick(e) { if (e) { return; } }\n}\n";
        let found = classes(src);
        let class = &found[0];
        let props: Vec<_> = class.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(props, vec!["title", "changed"]);
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "onClick");
    }

    #[test]
    fn test_interfaces_and_type_aliases() {
        let src = r#"
export interface User extends Entity, Timestamped {
  id: string;
  email?: string
  roles: Array<{ name: string }>;
  greet(name: string): string;
}
type Props = {
  title: string,
  onSelect: (id: string) => void,
};
type Id = string;
"#;
        let found = extract_interfaces(src, &LineIndex::new(src));
        assert_eq!(found.len(), 2);
        let user = &found[0];
        assert_eq!(user.extends, vec!["Entity", "Timestamped"]);
        let names: Vec<_> = user.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["id", "email", "roles", "greet"]);
        assert_eq!(user.members[3].kind, SymbolKind::Method);

        let props = &found[1];
        assert_eq!(props.symbol.kind, SymbolKind::TypeAlias);
        assert_eq!(props.members.len(), 2);
        assert_eq!(props.members[1].return_type.as_deref(), Some("(id: string) => void"));
    }

    #[test]
    fn test_python_classes() {
        let src = "class Repo(Base, Mixin):\n    table: str = \"users\"\n\n    def __init__(self, db):\n        self.db = db\n\n    def _hidden(self):\n        pass\n\nvalue = 1\n";
        let found = extract_python_classes(src, &LineIndex::new(src));
        assert_eq!(found.len(), 1);
        let repo = &found[0];
        assert_eq!(repo.extends.as_deref(), Some("Base"));
        assert_eq!(repo.implements, vec!["Mixin"]);
        assert_eq!(repo.methods.len(), 2);
        assert_eq!(repo.methods[1].visibility, Some(Visibility::Private));
        assert_eq!(repo.properties.len(), 1);
        assert_eq!(repo.properties[0].name, "table");
    }

    #[test]
    fn test_unclosed_class_is_skipped() {
        assert!(classes("class Broken {\n  method() {\n").is_empty());
    }
}
