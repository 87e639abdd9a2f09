//! Lexical scanning helpers shared by the extractors
//!
//! Everything here works on byte offsets into UTF-8 text and only ever
//! inspects ASCII delimiters, so returned offsets are always char boundaries.

/// Byte offset → 1-based line number lookup
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    Single,
    Double,
    Template,
    LineComment,
    BlockComment,
}

/// Find the `}` matching the `{` at `open`, skipping strings, template
/// literals and comments. Returns `None` when the block never closes.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    find_matching(text, open, b'{', b'}')
}

/// Same as `find_matching_brace` for parentheses
pub fn find_matching_paren(text: &str, open: usize) -> Option<usize> {
    find_matching(text, open, b'(', b')')
}

fn find_matching(text: &str, open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&open_ch) {
        return None;
    }

    let mut depth = 0usize;
    let mut mode = Mode::Code;
    let mut i = open;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match mode {
            Mode::Code => {
                if b == open_ch {
                    depth += 1;
                } else if b == close_ch {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                } else {
                    match (b, next) {
                        (b'/', Some(b'/')) => {
                            mode = Mode::LineComment;
                            i += 1;
                        }
                        (b'/', Some(b'*')) => {
                            mode = Mode::BlockComment;
                            i += 1;
                        }
                        (b'\'', _) => mode = Mode::Single,
                        (b'"', _) => mode = Mode::Double,
                        (b'`', _) => mode = Mode::Template,
                        _ => {}
                    }
                }
            }
            Mode::Single | Mode::Double | Mode::Template => {
                let quote = match mode {
                    Mode::Single => b'\'',
                    Mode::Double => b'"',
                    _ => b'`',
                };
                if b == b'\\' {
                    i += 1;
                } else if b == quote {
                    mode = Mode::Code;
                } else if b == b'\n' && mode != Mode::Template {
                    // Unterminated string: resync at end of line
                    mode = Mode::Code;
                }
            }
            Mode::LineComment => {
                if b == b'\n' {
                    mode = Mode::Code;
                }
            }
            Mode::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    mode = Mode::Code;
                    i += 1;
                }
            }
        }
        i += 1;
    }
    None
}

/// Split on `sep` at nesting depth 0 (parens, brackets, braces, angle
/// brackets and quotes respected). Empty pieces are dropped.
pub fn split_top_level(s: &str, sep: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<char> = None;
    let mut current = String::new();
    let mut prev = '\0';

    for c in s.chars() {
        if let Some(q) = quote {
            current.push(c);
            if c == q && prev != '\\' {
                quote = None;
            }
            prev = c;
            continue;
        }
        match c {
            '"' | '\'' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' | '<' => {
                depth += 1;
                current.push(c);
            }
            // `=>` is not a closing angle bracket
            '>' if prev == '=' => current.push(c),
            ')' | ']' | '}' | '>' => {
                depth = (depth - 1).max(0);
                current.push(c);
            }
            c if c == sep && depth == 0 => {
                let piece = current.trim();
                if !piece.is_empty() {
                    parts.push(piece.to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
        prev = c;
    }
    let piece = current.trim();
    if !piece.is_empty() {
        parts.push(piece.to_string());
    }
    parts
}

/// Offset of the first `{` at or after `from`, stopping at `;`
pub fn next_open_brace(text: &str, from: usize) -> Option<usize> {
    let rest = text.get(from..)?;
    for (i, b) in rest.bytes().enumerate() {
        match b {
            b'{' => return Some(from + i),
            b';' => return None,
            _ => {}
        }
    }
    None
}

/// Count branching constructs: `if for while switch case catch` plus `&& ||`
pub fn count_branches(text: &str) -> usize {
    const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "case", "catch", "elif", "except"];
    let mut count = 0;
    for token in text.split(|c: char| !(c.is_alphanumeric() || c == '_')) {
        if KEYWORDS.contains(&token) {
            count += 1;
        }
    }
    count + text.matches("&&").count() + text.matches("||").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_index() {
        let idx = LineIndex::new("a\nbc\n\nd");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 2);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(5), 3);
        assert_eq!(idx.line_of(6), 4);
    }

    #[test]
    fn test_matching_brace_nested() {
        let src = "class A { m() { return { a: 1 }; } }";
        let open = src.find('{').unwrap();
        assert_eq!(find_matching_brace(src, open), Some(src.len() - 1));
    }

    #[test]
    fn test_matching_brace_ignores_strings_and_comments() {
        let src = "{ const s = \"}\"; const t = `${x}}`; // }\n /* } */ const c = '}'; }";
        assert_eq!(find_matching_brace(src, 0), Some(src.len() - 1));
    }

    #[test]
    fn test_unclosed_brace() {
        assert_eq!(find_matching_brace("{ { }", 0), None);
        assert_eq!(find_matching_brace("x", 0), None);
    }

    #[test]
    fn test_split_top_level() {
        let parts = split_top_level("a: string, { b, c }: Props, d = fn(1, 2), e: Map<K, V>", ',');
        assert_eq!(parts, vec!["a: string", "{ b, c }: Props", "d = fn(1, 2)", "e: Map<K, V>"]);
        assert_eq!(split_top_level("cb = () => x, y", ','), vec!["cb = () => x", "y"]);
        assert!(split_top_level("  ", ',').is_empty());
    }

    #[test]
    fn test_count_branches() {
        assert_eq!(count_branches("if (a && b) { for (;;) {} } else if (c || d) {}"), 5);
        assert_eq!(count_branches("const gift = notify();"), 0);
    }
}
