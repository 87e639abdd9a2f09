//! Model reply validation
//!
//! - `json_repair`: tolerant JSON extraction (fenced block, then whole body)
//! - `repair`: schema check, lenient decoding and default filling

mod json_repair;
mod repair;

pub use json_repair::{JsonRepairer, extract_response_json, fenced_block};
pub use repair::{parse_generation_result, repair_generation_result};

use crate::types::{Result, WorkflowGenerationResult};

/// Raw reply text to a repaired result, or the reason it was unusable
pub fn process_reply(raw: &str) -> Result<WorkflowGenerationResult> {
    let value = extract_response_json(raw)?;
    let result = parse_generation_result(&value)?;
    Ok(repair_generation_result(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_fenced_reply() {
        let reply = "Here you go:\n```json\n{\"userStories\": [{\"id\": \"x\", \"title\": \"Sign in\",}]}\n```";
        let result = process_reply(reply).unwrap();
        assert_eq!(result.user_stories[0].id, "US001");
        assert_eq!(result.user_stories[0].title, "Sign in");
    }

    #[test]
    fn test_process_rejects_schema_invalid() {
        assert!(process_reply("{\"summary\": \"nothing useful\"}").is_err());
        assert!(process_reply("no json at all").is_err());
    }
}
