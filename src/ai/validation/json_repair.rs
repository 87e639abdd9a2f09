//! Tolerant JSON extraction for model replies
//!
//! Replies arrive wrapped in prose, fenced in markdown, cut off mid-string,
//! or with trailing commas. Extraction tries the first fenced block, then
//! the whole body; each candidate goes through increasingly aggressive
//! repair passes before giving up.

use serde_json::Value;
use tracing::debug;

use crate::types::{Result, ScribeError};

/// Parse the JSON payload of a model reply
pub fn extract_response_json(raw: &str) -> Result<Value> {
    let repairer = JsonRepairer::new();
    if let Some(block) = fenced_block(raw)
        && let Ok((value, _)) = repairer.parse_or_repair(block)
    {
        return Ok(value);
    }
    repairer.parse_or_repair(raw).map(|(value, _)| value)
}

/// Body of the first ``` fence, preferring one tagged `json`
pub fn fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```json").or_else(|| raw.find("```"))?;
    let after_tag = &raw[open + 3..];
    let body_start = after_tag.find('\n').map(|i| i + 1)?;
    let body = &after_tag[body_start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(body[..end].trim())
}

// =============================================================================
// JsonRepairer
// =============================================================================

/// String-aware scan state shared by the repair passes
#[derive(Default)]
struct Scan {
    in_string: bool,
    escape: bool,
    /// Open `{` and `[` in nesting order
    stack: Vec<char>,
}

impl Scan {
    /// Feed one char; returns true when it is structural (outside a string)
    fn feed(&mut self, ch: char) -> bool {
        if self.escape {
            self.escape = false;
            return false;
        }
        match ch {
            '\\' if self.in_string => {
                self.escape = true;
                false
            }
            '"' => {
                self.in_string = !self.in_string;
                false
            }
            _ if self.in_string => false,
            '{' | '[' => {
                self.stack.push(ch);
                true
            }
            '}' | ']' => {
                self.stack.pop();
                true
            }
            _ => true,
        }
    }
}

pub struct JsonRepairer {
    max_repair_attempts: usize,
}

impl Default for JsonRepairer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonRepairer {
    pub fn new() -> Self {
        Self {
            max_repair_attempts: 3,
        }
    }

    /// Parse JSON, attempting repair if the direct parse fails.
    ///
    /// Returns `(value, was_repaired)`.
    pub fn parse_or_repair(&self, raw: &str) -> Result<(Value, bool)> {
        let cleaned = preprocess(raw);
        if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
            return Ok((value, false));
        }

        let candidate = extract_outermost(&cleaned).unwrap_or(&cleaned);
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            debug!("JSON extracted from surrounding text");
            return Ok((value, true));
        }

        for level in 1..=self.max_repair_attempts {
            let repaired = repair_pass(candidate, level);
            if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
                debug!(level, "JSON repaired");
                return Ok((value, true));
            }
        }

        Err(ScribeError::LlmApi(format!(
            "Failed to parse or repair JSON after {} attempts. Content preview: {}...",
            self.max_repair_attempts,
            cleaned.chars().take(200).collect::<String>()
        )))
    }
}

fn preprocess(raw: &str) -> String {
    let mut s = raw.trim().trim_start_matches('\u{feff}');
    if s.starts_with("```") {
        s = match s.find('\n') {
            Some(i) => &s[i + 1..],
            None => "",
        };
    }
    s.trim_end().trim_end_matches("```").trim().to_string()
}

fn repair_pass(s: &str, level: usize) -> String {
    let mut result = strip_trailing_commas(s);
    if level >= 2 {
        result = close_strings_at_newlines(&result);
    }
    if level >= 3 {
        result = result
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
            .collect();
        result = drop_dangling_tail(&result);
    }
    close_open_structures(&result)
}

/// Slice from the first `{`/`[` to its matching closer, or to the end
fn extract_outermost(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut scan = Scan::default();
    for (i, ch) in s[start..].char_indices() {
        if scan.feed(ch) && matches!(ch, '}' | ']') && scan.stack.is_empty() {
            return Some(&s[start..start + i + 1]);
        }
    }
    Some(&s[start..])
}

fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut scan = Scan::default();
    for (i, &ch) in chars.iter().enumerate() {
        let structural = scan.feed(ch);
        if structural && ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']') | None) {
                continue;
            }
        }
        result.push(ch);
    }
    result
}

fn close_strings_at_newlines(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    let mut scan = Scan::default();
    for ch in s.chars() {
        if scan.in_string && !scan.escape && matches!(ch, '\n' | '\r') {
            result.push('"');
            scan.in_string = false;
        }
        scan.feed(ch);
        result.push(ch);
    }
    result
}

/// Cut back to the last complete value inside the open structures
fn drop_dangling_tail(s: &str) -> String {
    let mut scan = Scan::default();
    let mut last_boundary = None;
    for (i, ch) in s.char_indices() {
        if scan.feed(ch) && matches!(ch, '}' | ']' | ',') {
            last_boundary = Some(if ch == ',' { i } else { i + 1 });
        }
    }
    match last_boundary {
        Some(end) if scan.in_string || !scan.stack.is_empty() => s[..end].to_string(),
        _ => s.to_string(),
    }
}

fn close_open_structures(s: &str) -> String {
    let mut scan = Scan::default();
    s.chars().for_each(|ch| {
        scan.feed(ch);
    });
    let mut result = strip_trailing_commas(s.trim_end());
    if scan.in_string {
        result.push('"');
    }
    while let Some(open) = scan.stack.pop() {
        result.push(if open == '{' { '}' } else { ']' });
    }
    result
}
