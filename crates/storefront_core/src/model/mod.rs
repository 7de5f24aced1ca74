//! Store domain model.
//!
//! # Responsibility
//! - Define the records owned by the store schema.
//! - Validate field-level invariants before persistence.
//!
//! # Invariants
//! - Every persisted record is identified by a positive SQLite row id.
//! - Money is stored as integer cents, never as floating point.

use thiserror::Error;

pub mod collection;
pub mod customer;
pub mod money;
pub mod order;
pub mod product;
pub mod tag;

/// Field-level validation failure for any store record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelValidationError {
    #[error("{model}.{field} cannot be blank")]
    BlankField {
        model: &'static str,
        field: &'static str,
    },
    #[error("{model}.{field} must be greater than or equal to {min}, got {value}")]
    BelowMinimum {
        model: &'static str,
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("invalid {field} code `{value}`")]
    UnknownChoice { field: &'static str, value: String },
}

/// Every model known to the store schema, as registered with the admin and
/// referenced by tagged items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelKind {
    Collection,
    Product,
    Customer,
    Order,
    OrderItem,
    Tag,
}

impl ModelKind {
    pub const ALL: [ModelKind; 6] = [
        Self::Collection,
        Self::Product,
        Self::Customer,
        Self::Order,
        Self::OrderItem,
        Self::Tag,
    ];

    /// Application the model belongs to.
    pub fn app_label(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            _ => "store",
        }
    }

    /// Lowercase model name, also used as the tagged-item content type.
    pub fn model_name(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Product => "product",
            Self::Customer => "customer",
            Self::Order => "order",
            Self::OrderItem => "orderitem",
            Self::Tag => "tag",
        }
    }

    pub fn from_model_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.model_name().eq_ignore_ascii_case(name))
    }

    /// Concrete field names, foreign keys named without the `_id` suffix.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            Self::Collection => &["id", "title", "featured_product"],
            Self::Product => &[
                "id",
                "title",
                "slug",
                "description",
                "unit_price",
                "inventory",
                "last_update",
                "collection",
            ],
            Self::Customer => &[
                "id",
                "first_name",
                "last_name",
                "email",
                "phone",
                "birth_date",
                "membership",
            ],
            Self::Order => &["id", "placed_at", "payment_status", "customer"],
            Self::OrderItem => &["id", "order", "product", "quantity", "unit_price"],
            Self::Tag => &["id", "label"],
        }
    }

    pub fn has_field(self, field: &str) -> bool {
        self.fields().contains(&field)
    }

    /// Target model of a foreign-key field.
    pub fn foreign_key_target(self, field: &str) -> Option<ModelKind> {
        match (self, field) {
            (Self::Collection, "featured_product") => Some(Self::Product),
            (Self::Product, "collection") => Some(Self::Collection),
            (Self::Order, "customer") => Some(Self::Customer),
            (Self::OrderItem, "order") => Some(Self::Order),
            (Self::OrderItem, "product") => Some(Self::Product),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.app_label(), self.model_name())
    }
}

pub(crate) fn require_text(
    model: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField { model, field });
    }
    Ok(())
}

pub(crate) fn require_min(
    model: &'static str,
    field: &'static str,
    value: i64,
    min: i64,
) -> Result<(), ModelValidationError> {
    if value < min {
        return Err(ModelValidationError::BelowMinimum {
            model,
            field,
            min,
            value,
        });
    }
    Ok(())
}
