//! Collection model: a named grouping of products.

use super::product::ProductId;
use super::{require_text, ModelValidationError};
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub type CollectionId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: CollectionId,
    pub title: String,
    /// Optional product highlighted for this collection.
    pub featured_product_id: Option<ProductId>,
}

/// Insert payload for a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCollection {
    pub title: String,
    pub featured_product_id: Option<ProductId>,
}

impl NewCollection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            featured_product_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("collection", "title", &self.title)
    }
}

impl Collection {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("collection", "title", &self.title)
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}
