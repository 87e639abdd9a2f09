//! Minified-source heuristic

use std::sync::LazyLock;

use regex::Regex;

use crate::config::MinifiedConfig;

static SINGLE_LETTER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-zA-Z]\b").expect("valid regex"));

/// Independently tunable thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinifiedThresholds {
    /// Fewer lines than this...
    pub max_lines: usize,
    /// ...combined with more characters than this marks a file minified
    pub min_chars: usize,
    /// More single-letter tokens than this marks a file minified
    pub max_single_letter_tokens: usize,
}

impl Default for MinifiedThresholds {
    fn default() -> Self {
        MinifiedConfig::default().into()
    }
}

impl From<MinifiedConfig> for MinifiedThresholds {
    fn from(c: MinifiedConfig) -> Self {
        Self {
            max_lines: c.max_lines,
            min_chars: c.min_chars,
            max_single_letter_tokens: c.max_single_letter_tokens,
        }
    }
}

/// `.min.` style names
pub fn has_minified_suffix(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains(".min.") || lower.ends_with("-min.js") || lower.ends_with(".prod.js")
}

pub fn is_minified(name: &str, content: &str, t: &MinifiedThresholds) -> bool {
    if has_minified_suffix(name) {
        return true;
    }

    let lines = content.lines().count();
    let chars = content.chars().count();
    if lines < t.max_lines && chars > t.min_chars {
        return true;
    }

    // Stop counting as soon as the limit is crossed
    SINGLE_LETTER_TOKEN
        .find_iter(content)
        .nth(t.max_single_letter_tokens)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_match() {
        let t = MinifiedThresholds::default();
        assert!(is_minified("jquery.min.js", "", &t));
        assert!(!is_minified("app.js", "const answer = 42;", &t));
    }

    #[test]
    fn test_long_short_file() {
        let t = MinifiedThresholds::default();
        let one_line = format!("var data = \"{}\";", "word".repeat(300));
        assert!(is_minified("bundle.js", &one_line, &t));

        let spread: String = (0..20).map(|i| format!("const item{} = {};\n", i, i)).collect();
        assert!(!is_minified("spread.js", &spread, &t));
    }

    #[test]
    fn test_single_letter_tokens() {
        let t = MinifiedThresholds::default();
        let fifty: String = (0..50).map(|_| "x\n").collect();
        assert!(!is_minified("ok.js", &fifty, &t));
        let fifty_one: String = (0..51).map(|_| "x\n").collect();
        assert!(is_minified("dense.js", &fifty_one, &t));
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let strict = MinifiedThresholds {
            max_lines: 10,
            min_chars: 1000,
            max_single_letter_tokens: 2,
        };
        assert!(is_minified("a.js", "a\nb\nc\n", &strict));
    }
}
