pub mod analysis;
pub mod document;
pub mod error;
pub mod node;
pub mod utils;
pub mod workflow;

pub use analysis::*;
pub use document::*;
pub use error::{
    ErrorCategory, ErrorClassifier, LlmError, Result, ScribeError, ValidationError,
    ValidationErrorKind,
};
pub use node::{FileNode, NodeCategory, NodeKind, file_extension};
pub use utils::{
    ParseWithDefault, capitalize_first, enum_to_str, estimate_tokens, humanize_identifier,
    log_filter_warn, squash_whitespace, truncate_chars, truncate_to_token_limit,
};
pub use workflow::*;
