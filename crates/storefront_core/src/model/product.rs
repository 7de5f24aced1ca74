//! Product model.
//!
//! # Invariants
//! - `unit_price` and `inventory` are never negative.
//! - `slug` is non-empty once persisted; it is derived from `title` when the
//!   caller leaves it blank.
//! - `last_update` is epoch milliseconds of the latest full-record write.

use super::collection::CollectionId;
use super::money::Money;
use super::{require_min, require_text, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{Display, Formatter};

pub type ProductId = i64;

/// Products with inventory strictly below this value are reported as low.
pub const LOW_INVENTORY_THRESHOLD: u32 = 10;

static SLUG_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid slug strip regex"));
static SLUG_DASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("valid slug dash regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub inventory: u32,
    pub last_update: i64,
    pub collection_id: CollectionId,
}

impl Product {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(&self.title, &self.slug, self.unit_price)
    }

    pub fn is_low_inventory(&self) -> bool {
        self.inventory < LOW_INVENTORY_THRESHOLD
    }
}

impl Display for Product {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Insert payload for a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub title: String,
    /// Left blank to derive it from `title`.
    pub slug: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub inventory: u32,
    pub collection_id: CollectionId,
}

impl NewProduct {
    pub fn new(
        title: impl Into<String>,
        unit_price: Money,
        inventory: u32,
        collection_id: CollectionId,
    ) -> Self {
        Self {
            title: title.into(),
            slug: String::new(),
            description: None,
            unit_price,
            inventory,
            collection_id,
        }
    }

    /// Returns the slug to persist: the explicit one, or one derived from the title.
    pub fn effective_slug(&self) -> String {
        if self.slug.trim().is_empty() {
            slugify(&self.title)
        } else {
            self.slug.trim().to_string()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(&self.title, &self.effective_slug(), self.unit_price)
    }
}

fn validate_fields(title: &str, slug: &str, unit_price: Money) -> Result<(), ModelValidationError> {
    require_text("product", "title", title)?;
    require_text("product", "slug", slug)?;
    require_min("product", "unit_price", unit_price.cents(), 0)
}

/// Converts a title into a URL slug: lowercase ASCII words joined by `-`.
pub fn slugify(value: &str) -> String {
    let lowered = value.to_lowercase();
    let stripped = SLUG_STRIP_RE.replace_all(&lowered, "");
    let dashed = SLUG_DASH_RE.replace_all(stripped.trim(), "-");
    dashed.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::{slugify, NewProduct};
    use crate::model::money::Money;

    #[test]
    fn slugify_collapses_separators_and_drops_punctuation() {
        assert_eq!(slugify("  Bread - Rye, Seeded!  "), "bread-rye-seeded");
        assert_eq!(slugify("Coffee  Beans"), "coffee-beans");
    }

    #[test]
    fn blank_slug_is_prepopulated_from_title() {
        let product = NewProduct::new("Maple Syrup", Money::from_cents(499), 3, 1);
        assert_eq!(product.effective_slug(), "maple-syrup");
    }

    #[test]
    fn validate_rejects_title_without_slug_material() {
        let product = NewProduct::new("!!!", Money::from_cents(100), 1, 1);
        assert!(product.validate().is_err());
    }
}
