//! Generic tags attachable to any store record.

use super::{require_text, ModelValidationError};
use serde::Serialize;

pub type TagId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("tag", "label", &self.label)
    }
}

/// Link between a tag and an arbitrary record, keyed by content type name
/// (for example `product`) and row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaggedItem {
    pub id: i64,
    pub tag: Tag,
    pub content_type: String,
    pub object_id: i64,
}

/// Normalizes a tag label for storage: trimmed, inner whitespace collapsed.
pub fn normalize_label(label: &str) -> Option<String> {
    let normalized = label.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
