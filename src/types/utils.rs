//! Shared utility functions for string handling and lenient parsing.

use serde::Serialize;
use std::fmt::Display;

// =============================================================================
// String Utilities
// =============================================================================

/// Capitalize the first character of a string.
#[inline]
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

/// Split `camelCase`, `snake_case` and `kebab-case` identifiers into
/// space-separated title words: `createUserOrder` -> `Create User Order`.
pub fn humanize_identifier(ident: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in ident.chars() {
        if c == '_' || c == '-' || c == ' ' || c == '/' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && current.chars().last().is_some_and(|p| p.is_lowercase()) {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
        .iter()
        .map(|w| capitalize_first(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary.
/// When anything was cut the result ends in `...`, counted in the limit.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.char_indices().nth(max_chars).is_none() {
        return s.to_string();
    }
    let prefix = |n: usize| match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    };
    if max_chars <= ELLIPSIS.len() {
        return prefix(max_chars).to_string();
    }
    format!("{}{}", prefix(max_chars - ELLIPSIS.len()), ELLIPSIS)
}

const ELLIPSIS: &str = "...";

/// Collapse runs of whitespace into single spaces.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

// =============================================================================
// Type Parsing
// =============================================================================

/// Trait for parsing strings into enum types with a default fallback.
/// Used for model output where invalid strings should fall back gracefully.
/// Logs a warning when an invalid value is encountered.
pub trait ParseWithDefault: Sized {
    /// The name of this type for logging purposes.
    fn type_name() -> &'static str;

    /// The default value to use when parsing fails.
    fn default_value() -> Self;

    /// Try to parse the string, returning None if invalid.
    fn try_parse(s: &str) -> Option<Self>;

    /// Parse a string into this type, returning a default value if parsing fails.
    fn parse_or_default(s: &str) -> Self {
        match Self::try_parse(s) {
            Some(v) => v,
            None => {
                if !s.trim().is_empty() {
                    tracing::warn!("Invalid {} value '{}', using default", Self::type_name(), s);
                }
                Self::default_value()
            }
        }
    }

    /// Same as `parse_or_default` but for absent values.
    fn parse_opt_or_default(s: Option<&str>) -> Self {
        s.map(Self::parse_or_default)
            .unwrap_or_else(Self::default_value)
    }
}

/// Serialize an enum to its serde string representation (without quotes).
pub fn enum_to_str<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_default()
        .trim_matches('"')
        .to_string()
}

/// Like `.ok()` but logs the discarded error at warn level.
pub fn log_filter_warn<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!("{}: {}", context, e);
            None
        }
    }
}

// =============================================================================
// Token Estimation
// =============================================================================

/// Rough token count: 4 ASCII chars or 1.5 non-ASCII chars per token.
pub fn estimate_tokens(content: &str) -> usize {
    if content.is_empty() {
        return 0;
    }
    let (ascii, other) = content.chars().fold((0usize, 0usize), |(a, o), c| {
        if c.is_ascii() { (a + 1, o) } else { (a, o + 1) }
    });
    (ascii as f32 / 4.0) as usize + (other as f32 / 1.5) as usize
}

/// Truncate content to fit within a token limit, preferring line boundaries.
pub fn truncate_to_token_limit(content: &str, max_tokens: usize) -> String {
    let estimated = estimate_tokens(content);
    if estimated <= max_tokens {
        return content.to_string();
    }

    let ratio = max_tokens as f64 / estimated as f64;
    let max_chars = (content.chars().count() as f64 * ratio * 0.95) as usize;
    let cut = content
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(content.len());
    let truncated = &content[..cut];

    let body = match truncated.rfind('\n') {
        Some(pos) => &content[..pos],
        None => truncated,
    };
    format!("{}\n... [truncated]", body)
}
