//! UI interaction extraction: components, forms, bound handlers, navigation

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::Language;
use crate::analyzer::scan::{LineIndex, split_top_level};
use crate::types::{
    ComponentInteraction, EventHandlerRecord, FileAnalysis, FormRecord, NavigationRecord, UiInteractionRecord,
    squash_whitespace, truncate_chars,
};

/// Longest inline handler expression kept verbatim
const INLINE_HANDLER_CHARS: usize = 80;

static HOOK_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(use[A-Z]\w*)\s*(?:<[^>()]*>)?\s*\(").expect("valid regex"));

static HANDLER_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bfunction\s+|\b(?:const|let)\s+)((?:handle|on)[A-Z]\w*)\b").expect("valid regex")
});

static FORM_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<form\b").expect("valid regex"));

static FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:<(?:input|select|textarea|Input|Select|TextField)\b[^>]*?\bname\s*=\s*\{?\s*['"]([^'"]+)['"]|\bregister\(\s*['"]([^'"]+)['"]|\bv-model(?:\.\w+)*\s*=\s*"(?:\w+\.)?(\w+)")"#)
        .expect("valid regex")
});

static SUBMIT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bonSubmit\s*=\s*\{\s*(?:handleSubmit\(\s*)?([\w.]+)|@submit(?:\.\w+)*\s*=\s*"([\w.]+)|on:submit(?:\|\w+)*\s*=\s*\{\s*([\w.]+))"#)
        .expect("valid regex")
});

static JSX_EVENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bon([A-Z]\w*)\s*=\s*\{").expect("valid regex"));

static VUE_EVENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:@|v-on:)([a-z][\w-]*)(?:\.[\w-]+)*\s*=\s*"([^"]+)""#).expect("valid regex")
});

static NAVIGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?P<navigate>\bnavigate\(\s*['"`]([^'"`]+)['"`])"#,
        r#"|(?P<router>\brouter\.(?:push|replace)\(\s*['"`]([^'"`]+)['"`])"#,
        r#"|(?P<link><(?:Link|NavLink|router-link|RouterLink)\b[^>]*?\b(?:href|to)\s*=\s*\{?\s*['"`]([^'"`]+)['"`])"#,
        r#"|(?P<location>\bwindow\.location(?:\.href)?\s*=\s*['"`]([^'"`]+)['"`])"#,
        r#"|(?P<redirect>\bredirect\(\s*['"`]([^'"`]+)['"`])"#,
    ))
    .expect("valid regex")
});

const CONTENT_PROBES: &[&str] = &[
    "useState", "useEffect", "onClick", "onChange", "onSubmit", "<form", "@click", "v-model", "on:click",
    "navigate(", "router.push", "<Link",
];

pub fn is_frontend_shaped(file: &FileAnalysis) -> bool {
    matches!(
        file.language,
        Language::Jsx | Language::Tsx | Language::Vue | Language::Svelte
    ) || file.components().next().is_some()
        || CONTENT_PROBES.iter().any(|p| file.content.contains(p))
}

pub fn extract_ui_interactions(file: &FileAnalysis) -> UiInteractionRecord {
    let text = file.content.as_str();
    let lines = LineIndex::new(text);

    UiInteractionRecord {
        file: file.path.clone(),
        components: components(file),
        forms: forms(text, &lines),
        event_handlers: event_handlers(text, &lines),
        navigation: navigation(text, &lines),
    }
}

// =============================================================================
// Components
// =============================================================================

/// Each component owns the text from its declaration up to the next one
fn components(file: &FileAnalysis) -> Vec<ComponentInteraction> {
    let text = file.content.as_str();
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let offset_of = |line: usize| line_starts.get(line.saturating_sub(1)).copied().unwrap_or(text.len());

    let mut declared: Vec<_> = file.components().collect();
    declared.sort_by_key(|c| c.line);

    let mut out: Vec<ComponentInteraction> = declared
        .iter()
        .enumerate()
        .map(|(idx, component)| {
            let start = offset_of(component.line);
            let end = declared
                .get(idx + 1)
                .map(|next| offset_of(next.line))
                .unwrap_or(text.len());
            let segment = &text[start..end.max(start)];
            ComponentInteraction {
                name: component.name.clone(),
                props: component.params.first().map(|p| prop_names(&p.name)).unwrap_or_default(),
                hooks: unique(HOOK_CALL.captures_iter(segment).filter_map(|c| c.get(1)).map(|m| m.as_str())),
                handlers: unique(HANDLER_DECL.captures_iter(segment).filter_map(|c| c.get(1)).map(|m| m.as_str())),
            }
        })
        .collect();

    // single-file components are named after the file
    if out.is_empty() && matches!(file.language, Language::Vue | Language::Svelte) {
        let stem = file.name.split('.').next().unwrap_or(&file.name);
        out.push(ComponentInteraction {
            name: stem.to_string(),
            props: Vec::new(),
            hooks: unique(HOOK_CALL.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str())),
            handlers: unique(HANDLER_DECL.captures_iter(text).filter_map(|c| c.get(1)).map(|m| m.as_str())),
        });
    }
    out
}

/// `{ items, onAdd = noop }` → `items, onAdd`; `props: Props` → `props`
fn prop_names(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let Some(inner) = trimmed
        .strip_prefix('{')
        .and_then(|s| s.rfind('}').map(|end| &s[..end]))
    else {
        let name = trimmed.split(':').next().unwrap_or(trimmed).trim();
        return if name.is_empty() { Vec::new() } else { vec![name.to_string()] };
    };
    split_top_level(inner, ',')
        .iter()
        .map(|piece| {
            piece
                .trim_start_matches("...")
                .split(['=', ':'])
                .next()
                .unwrap_or(piece)
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty())
        .collect()
}

fn unique<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        if !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

// =============================================================================
// Forms, Events, Navigation
// =============================================================================

fn forms(text: &str, lines: &LineIndex) -> Vec<FormRecord> {
    FORM_OPEN
        .find_iter(text)
        .map(|open| {
            let end = text[open.end()..]
                .find("</form>")
                .map(|i| open.end() + i)
                .unwrap_or(text.len());
            let block = &text[open.start()..end];
            let fields = unique(
                FIELD_NAME
                    .captures_iter(block)
                    .filter_map(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
                    .map(|m| m.as_str()),
            );
            let submit_handler = SUBMIT_HANDLER
                .captures(block)
                .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
                .map(|m| m.as_str().to_string());
            FormRecord {
                fields,
                submit_handler,
                line: lines.line_of(open.start()),
            }
        })
        .collect()
}

fn event_handlers(text: &str, lines: &LineIndex) -> Vec<EventHandlerRecord> {
    let mut out = Vec::new();

    for caps in JSX_EVENT.captures_iter(text) {
        let (Some(whole), Some(event)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let open = whole.end() - 1;
        let Some(close) = crate::analyzer::scan::find_matching_brace(text, open) else {
            continue;
        };
        let handler = squash_whitespace(&text[open + 1..close]);
        if handler.is_empty() {
            continue;
        }
        out.push(EventHandlerRecord {
            event: event.as_str().to_ascii_lowercase(),
            handler: truncate_chars(&handler, INLINE_HANDLER_CHARS),
            line: lines.line_of(whole.start()),
        });
    }

    for caps in VUE_EVENT.captures_iter(text) {
        let (Some(whole), Some(event), Some(handler)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };
        out.push(EventHandlerRecord {
            event: event.as_str().to_string(),
            handler: truncate_chars(&squash_whitespace(handler.as_str()), INLINE_HANDLER_CHARS),
            line: lines.line_of(whole.start()),
        });
    }

    out.sort_by_key(|h| h.line);
    out
}

fn navigation(text: &str, lines: &LineIndex) -> Vec<NavigationRecord> {
    NAVIGATION
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (via, target) = ["navigate", "router", "link", "location", "redirect"]
                .iter()
                .zip([2, 4, 6, 8, 10])
                .find_map(|(name, group)| caps.name(name).and(caps.get(group)).map(|t| (*name, t)))?;
            let via = match via {
                "navigate" => "navigate()",
                "router" => "router.push",
                "link" => "<Link>",
                "location" => "window.location",
                _ => "redirect()",
            };
            Some(NavigationRecord {
                target: target.as_str().to_string(),
                via: via.to_string(),
                line: lines.line_of(whole.start()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::symbols::analyze_file;
    use crate::types::{FileNode, NodeCategory};

    fn analysis(path: &str, content: &str) -> FileAnalysis {
        let name = path.rsplit('/').next().unwrap_or(path);
        let mut node = FileNode::file(name, path, content.to_string());
        node.category = Some(NodeCategory::Source);
        analyze_file(&node)
    }

    const LOGIN_FORM: &str = r#"import { useState } from 'react';
import { useNavigate } from 'react-router-dom';

export function LoginForm({ onSuccess, title = 'Sign in' }) {
  const [email, setEmail] = useState('');
  const navigate = useNavigate();

  const handleSubmit = async (event) => {
    event.preventDefault();
    onSuccess();
    navigate('/dashboard');
  };

  return (
    <form onSubmit={handleSubmit}>
      <input name="email" value={email} onChange={(e) => setEmail(e.target.value)} />
      <input name="password" type="password" />
      <button type="submit">{title}</button>
    </form>
  );
}
"#;

    #[test]
    fn test_react_form_component() {
        let file = analysis("src/components/LoginForm.jsx", LOGIN_FORM);
        assert!(is_frontend_shaped(&file));
        let record = extract_ui_interactions(&file);

        assert_eq!(record.components.len(), 1);
        let component = &record.components[0];
        assert_eq!(component.name, "LoginForm");
        assert_eq!(component.props, vec!["onSuccess", "title"]);
        assert_eq!(component.hooks, vec!["useState", "useNavigate"]);
        assert_eq!(component.handlers, vec!["handleSubmit"]);

        assert_eq!(record.forms.len(), 1);
        assert_eq!(record.forms[0].fields, vec!["email", "password"]);
        assert_eq!(record.forms[0].submit_handler.as_deref(), Some("handleSubmit"));

        let events: Vec<_> = record.event_handlers.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(events, vec!["submit", "change"]);

        assert_eq!(record.navigation.len(), 1);
        assert_eq!(record.navigation[0].target, "/dashboard");
        assert_eq!(record.navigation[0].via, "navigate()");
    }

    #[test]
    fn test_vue_single_file_component() {
        let file = analysis(
            "src/views/Checkout.vue",
            "<template>\n  <form @submit.prevent=\"placeOrder\">\n    <input v-model=\"form.address\" />\n    <button @click=\"cancel\">Cancel</button>\n  </form>\n  <router-link to=\"/cart\">Back</router-link>\n</template>\n<script setup>\nconst placeOrder = () => router.push('/thanks');\n</script>\n",
        );
        let record = extract_ui_interactions(&file);
        assert_eq!(record.components[0].name, "Checkout");
        assert_eq!(record.forms[0].fields, vec!["address"]);
        assert_eq!(record.forms[0].submit_handler.as_deref(), Some("placeOrder"));
        let events: Vec<_> = record
            .event_handlers
            .iter()
            .map(|e| (e.event.as_str(), e.handler.as_str()))
            .collect();
        assert_eq!(events, vec![("submit", "placeOrder"), ("click", "cancel")]);
        let targets: Vec<_> = record.navigation.iter().map(|n| n.target.as_str()).collect();
        assert_eq!(targets, vec!["/cart", "/thanks"]);
    }

    #[test]
    fn test_prop_names() {
        assert_eq!(prop_names("{ items, ...rest }"), vec!["items", "rest"]);
        assert_eq!(prop_names("props"), vec!["props"]);
        assert!(prop_names("").is_empty());
    }

    #[test]
    fn test_plain_module_is_not_frontend() {
        let file = analysis("src/lib/math.ts", "export function add(a: number, b: number) { return a + b; }\n");
        assert!(!is_frontend_shaped(&file));
        assert!(extract_ui_interactions(&file).is_empty());
    }
}
