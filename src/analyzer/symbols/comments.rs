//! Doc blocks and work markers

use std::sync::LazyLock;

use regex::Regex;

use super::functions::flatten_doc_block;
use crate::analyzer::scan::LineIndex;
use crate::types::{CommentKind, CommentRecord};

static DOC_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").expect("valid regex"));

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?://|#|/\*|\*|<!--)\s*(TODO|FIXME|HACK|NOTE|XXX)\b(?:\(([^)\n]*)\))?:?\s*([^\n]*)").expect("valid regex")
});

pub fn extract_comments(text: &str, lines: &LineIndex) -> Vec<CommentRecord> {
    let mut out: Vec<CommentRecord> = DOC_BLOCK
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let body = flatten_doc_block(caps.get(1)?.as_str())?;
            Some(CommentRecord {
                line: lines.line_of(whole.start()),
                kind: CommentKind::Doc,
                text: body,
            })
        })
        .collect();

    for caps in MARKER.captures_iter(text) {
        let (Some(tag), Some(rest)) = (caps.get(1), caps.get(3)) else {
            continue;
        };
        let label = match caps.get(2) {
            Some(owner) => format!("{}({})", tag.as_str(), owner.as_str().trim()),
            None => tag.as_str().to_string(),
        };
        let rest = rest
            .as_str()
            .trim()
            .trim_end_matches("*/")
            .trim_end_matches("-->")
            .trim();
        let text = if rest.is_empty() {
            label
        } else {
            format!("{}: {}", label, rest)
        };
        out.push(CommentRecord {
            line: lines.line_of(tag.start()),
            kind: CommentKind::Marker,
            text,
        });
    }

    out.sort_by_key(|c| c.line);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_blocks_and_markers() {
        let src = "/**\n * Entry point.\n * @module app\n */\n// TODO: split this file\nconst x = 1; # FIXME(alice) handle nulls\n/* HACK */\n";
        let found = extract_comments(src, &LineIndex::new(src));
        assert_eq!(found.len(), 4);
        assert_eq!(found[0].kind, CommentKind::Doc);
        assert_eq!(found[0].text, "Entry point.");
        assert_eq!(found[1].text, "TODO: split this file");
        assert_eq!(found[1].line, 5);
        assert_eq!(found[2].text, "FIXME(alice): handle nulls");
        assert_eq!(found[3].text, "HACK");
    }

    #[test]
    fn test_identifiers_are_not_markers() {
        let src = "const todoList = [];\nconst NOTES = 1;\n";
        assert!(extract_comments(src, &LineIndex::new(src)).is_empty());
    }
}
