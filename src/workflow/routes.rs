//! Route extraction: registration calls, file-system handlers, UI routes

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::scan::{LineIndex, find_matching_paren, split_top_level};
use crate::constants::extraction::HANDLER_EXCERPT_CHARS;
use crate::types::{FileAnalysis, RouteKind, RouteRecord, squash_whitespace, truncate_chars};

/// Bytes scanned after `<Route` for its attributes
const ROUTE_TAG_WINDOW: usize = 400;

static REGISTER_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(\w*[Rr]outer|\w*[Aa]pp|server|fastify|routes|r)\.(get|post|put|patch|delete|options|head|all)\(\s*['"`](/[^'"`]*|\*)['"`]"#)
        .expect("valid regex")
});

static PY_DECORATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*@([A-Za-z_]\w*)\.(get|post|put|patch|delete|options|head)\(\s*['"]([^'"]*)['"]"#)
        .expect("valid regex")
});

static FLASK_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*@([A-Za-z_]\w*)\.route\(\s*['"]([^'"]*)['"]([^)]*)\)"#).expect("valid regex")
});

static FLASK_METHODS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"methods\s*=\s*[\[(]([^\])]*)[\])]").expect("valid regex"));

static PY_NEXT_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:async\s+)?def\s+([A-Za-z_]\w*)").expect("valid regex"));

static NEST_CONTROLLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@Controller\(\s*(?:['"]([^'"]*)['"])?"#).expect("valid regex")
});

static NEST_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@(Get|Post|Put|Patch|Delete|Options|Head|All)\(\s*(?:['"]([^'"]*)['"])?\s*\)"#)
        .expect("valid regex")
});

static NEXT_MEMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:public\s+|private\s+|async\s+)*([A-Za-z_$][\w$]*)\s*\(").expect("valid regex")
});

static VERB_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*export\s+(?:(?:async\s+)?function\s+|const\s+)(GET|POST|PUT|PATCH|DELETE|OPTIONS|HEAD)\b")
        .expect("valid regex")
});

static JSX_ROUTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<Route\b").expect("valid regex"));

static ATTR_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bpath\s*=\s*\{?\s*['"]([^'"]*)['"]"#).expect("valid regex"));

static ATTR_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:element\s*=\s*\{\s*<\s*([A-Z][\w.]*)|component\s*=\s*\{\s*([A-Z][\w.]*))")
        .expect("valid regex")
});

static ROUTE_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\s*path\s*:\s*['"]([^'"]*)['"]\s*,\s*(?:element\s*:\s*<\s*([A-Z][\w.]*)|component\s*:\s*([A-Z][\w.]*))"#)
        .expect("valid regex")
});

// =============================================================================
// Shape Probe
// =============================================================================

const PATH_PROBES: &[&str] = &[
    "/api/", "api/", "/routes/", "routes/", "/controllers/", "controllers/", "pages/api", "app/api",
    "router", "server",
];

const CONTENT_PROBES: &[&str] = &[
    ".get(", ".post(", ".put(", ".delete(", "express.Router", "Router()", "@Get(", "@Post(",
    "@Controller(", ".route(", "<Route", "createBrowserRouter", "createRouter(", "export async function GET",
    "export function GET", "export async function POST", "export function POST", "APIRouter",
];

pub fn is_route_shaped(file: &FileAnalysis) -> bool {
    let path = file.path.to_ascii_lowercase();
    PATH_PROBES.iter().any(|p| path.contains(p)) || CONTENT_PROBES.iter().any(|p| file.content.contains(p))
}

// =============================================================================
// Extraction
// =============================================================================

pub fn extract_routes(file: &FileAnalysis) -> Vec<RouteRecord> {
    let text = file.content.as_str();
    let lines = LineIndex::new(text);
    let mut routes = Vec::new();

    registered_calls(file, &lines, &mut routes);
    python_decorators(file, &lines, &mut routes);
    nest_decorators(file, &lines, &mut routes);
    file_system_handlers(file, &lines, &mut routes);
    ui_routes(file, &lines, &mut routes);

    routes.sort_by_key(|r| r.line);
    routes
}

fn route(file: &FileAnalysis, method: &str, path: &str, kind: RouteKind, line: usize) -> RouteRecord {
    RouteRecord {
        method: method.to_ascii_uppercase(),
        path: path.to_string(),
        kind,
        file: file.path.clone(),
        line,
        middleware: Vec::new(),
        handler: None,
        component: None,
    }
}

fn excerpt(text: &str) -> String {
    truncate_chars(&squash_whitespace(text), HANDLER_EXCERPT_CHARS)
}

/// `app.get('/x', auth, (req, res) => {...})`
fn registered_calls(file: &FileAnalysis, lines: &LineIndex, out: &mut Vec<RouteRecord>) {
    let text = file.content.as_str();
    for caps in REGISTER_CALL.captures_iter(text) {
        let (Some(whole), Some(verb), Some(path)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        // decorator forms are handled by `python_decorators`
        if text[..whole.start()].ends_with('@') {
            continue;
        }
        let method = if verb.as_str() == "all" { "ALL" } else { verb.as_str() };
        let mut record = route(file, method, path.as_str(), RouteKind::Registered, lines.line_of(whole.start()));

        let open = whole.start() + whole.as_str().find('(').unwrap_or(0);
        if let Some(close) = find_matching_paren(text, open) {
            let args = split_top_level(&text[open + 1..close], ',');
            if args.len() > 1 {
                let (handler, middle) = args[1..].split_last().unwrap_or((&args[1], &[]));
                record.middleware = middle.iter().map(|m| squash_whitespace(m)).collect();
                record.handler = Some(excerpt(handler));
            }
        }
        out.push(record);
    }
}

/// FastAPI `@app.get("/x")` and Flask `@app.route("/x", methods=[...])`
fn python_decorators(file: &FileAnalysis, lines: &LineIndex, out: &mut Vec<RouteRecord>) {
    let text = file.content.as_str();
    let handler_after = |offset: usize| {
        PY_NEXT_DEF
            .captures(&text[offset..])
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    for caps in PY_DECORATOR.captures_iter(text) {
        let (Some(whole), Some(verb), Some(path)) = (caps.get(0), caps.get(2), caps.get(3)) else {
            continue;
        };
        let mut record = route(file, verb.as_str(), path.as_str(), RouteKind::Registered, lines.line_of(whole.start()));
        record.handler = handler_after(whole.end());
        out.push(record);
    }

    for caps in FLASK_ROUTE.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let methods: Vec<String> = caps
            .get(3)
            .and_then(|rest| FLASK_METHODS.captures(rest.as_str()))
            .and_then(|m| m.get(1))
            .map(|list| {
                list.as_str()
                    .split(',')
                    .map(|m| m.trim().trim_matches(['"', '\'']).to_string())
                    .filter(|m| !m.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["GET".to_string()]);
        let handler = handler_after(whole.end());
        for method in methods {
            let mut record = route(file, &method, path.as_str(), RouteKind::Registered, lines.line_of(whole.start()));
            record.handler = handler.clone();
            out.push(record);
        }
    }
}

/// NestJS method decorators joined with the `@Controller` prefix
fn nest_decorators(file: &FileAnalysis, lines: &LineIndex, out: &mut Vec<RouteRecord>) {
    let text = file.content.as_str();
    let Some(controller) = NEST_CONTROLLER.captures(text) else {
        return;
    };
    let prefix = controller.get(1).map(|m| m.as_str()).unwrap_or("");

    for caps in NEST_METHOD.captures_iter(text) {
        let (Some(whole), Some(verb)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let sub = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let mut record = route(file, verb.as_str(), &join_paths(prefix, sub), RouteKind::Registered, lines.line_of(whole.start()));
        record.handler = NEXT_MEMBER
            .captures_iter(&text[whole.end()..])
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .find(|name| !name.starts_with(char::is_uppercase))
            .map(str::to_string);
        out.push(record);
    }
}

/// Next.js `app/**/route.ts` verb exports and `pages/api/**` default handlers
fn file_system_handlers(file: &FileAnalysis, lines: &LineIndex, out: &mut Vec<RouteRecord>) {
    let Some(url) = file_system_url(&file.path) else {
        return;
    };
    let text = file.content.as_str();

    let mut found = false;
    for caps in VERB_EXPORT.captures_iter(text) {
        let (Some(whole), Some(verb)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let mut record = route(file, verb.as_str(), &url, RouteKind::FileSystem, lines.line_of(whole.start()));
        record.handler = Some(verb.as_str().to_string());
        out.push(record);
        found = true;
    }

    let is_pages_api = file.path.contains("pages/api/");
    if !found
        && is_pages_api
        && let Some(offset) = text.find("export default")
    {
        let mut record = route(file, "ALL", &url, RouteKind::FileSystem, lines.line_of(offset));
        record.handler = Some(excerpt(&text[offset..]));
        out.push(record);
    }
}

/// URL for a file-system routed handler, if the path follows the convention
pub fn file_system_url(path: &str) -> Option<String> {
    let path = path.strip_prefix("src/").unwrap_or(path);
    let (dir, rest) = if let Some(rest) = path.strip_prefix("pages/api/") {
        ("api", rest)
    } else if let Some(rest) = path.strip_prefix("app/") {
        let name = rest.rsplit('/').next().unwrap_or(rest);
        if !name.starts_with("route.") {
            return None;
        }
        ("", rest)
    } else {
        return None;
    };

    let stem = rest.rsplit_once('.').map(|(s, _)| s).unwrap_or(rest);
    let segments: Vec<String> = stem
        .split('/')
        .filter(|s| *s != "index" && *s != "route" && !s.is_empty())
        // route groups `(marketing)` do not appear in the URL
        .filter(|s| !(s.starts_with('(') && s.ends_with(')')))
        .map(|s| match s.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(param) => format!(":{}", param.trim_start_matches("...")),
            None => s.to_string(),
        })
        .collect();

    let mut url = String::new();
    if !dir.is_empty() {
        url.push('/');
        url.push_str(dir);
    }
    for segment in segments {
        url.push('/');
        url.push_str(&segment);
    }
    if url.is_empty() {
        url.push('/');
    }
    Some(url)
}

/// `<Route path="/x" element={<X />} />` and `{ path: '/x', component: X }`
fn ui_routes(file: &FileAnalysis, lines: &LineIndex, out: &mut Vec<RouteRecord>) {
    let text = file.content.as_str();

    for m in JSX_ROUTE.find_iter(text) {
        let mut end = text[m.end()..]
            .find("<Route")
            .map(|i| m.end() + i)
            .unwrap_or(text.len())
            .min(m.start() + ROUTE_TAG_WINDOW);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let tag = &text[m.start()..end];
        let Some(path) = ATTR_PATH.captures(tag).and_then(|c| c.get(1)) else {
            continue;
        };
        let mut record = route(file, "VIEW", path.as_str(), RouteKind::UiRoute, lines.line_of(m.start()));
        record.component = ATTR_ELEMENT
            .captures(tag)
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|c| c.as_str().to_string());
        out.push(record);
    }

    for caps in ROUTE_OBJECT.captures_iter(text) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let mut record = route(file, "VIEW", path.as_str(), RouteKind::UiRoute, lines.line_of(whole.start()));
        record.component = caps.get(2).or_else(|| caps.get(3)).map(|c| c.as_str().to_string());
        out.push(record);
    }
}

fn join_paths(prefix: &str, sub: &str) -> String {
    let joined = [prefix.trim_matches('/'), sub.trim_matches('/')]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    format!("/{joined}")
}
