//! Order and order-item models.
//!
//! # Invariants
//! - `placed_at` is epoch milliseconds and never changes after insert.
//! - Order items carry their own `unit_price` snapshot, independent of later
//!   product price edits.
//! - `quantity` is strictly positive.

use super::customer::{Customer, CustomerId};
use super::money::Money;
use super::product::{Product, ProductId};
use super::{require_min, ModelValidationError};
use serde::Serialize;

pub type OrderId = i64;
pub type OrderItemId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Complete,
    Failed,
}

impl PaymentStatus {
    pub fn code(self) -> &'static str {
        match self {
            Self::Pending => "P",
            Self::Complete => "C",
            Self::Failed => "F",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, ModelValidationError> {
        match code {
            "P" => Ok(Self::Pending),
            "C" => Ok(Self::Complete),
            "F" => Ok(Self::Failed),
            other => Err(ModelValidationError::UnknownChoice {
                field: "payment_status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub placed_at: i64,
    pub payment_status: PaymentStatus,
    pub customer_id: CustomerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderItem {
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price.cents() * i64::from(self.quantity))
    }
}

/// Insert payload for one order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// `None` copies the product's current price.
    pub unit_price: Option<Money>,
}

impl NewOrderItem {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            unit_price: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_min("order_item", "quantity", i64::from(self.quantity), 1)?;
        if let Some(price) = self.unit_price {
            require_min("order_item", "unit_price", price.cents(), 0)?;
        }
        Ok(())
    }
}

/// Insert payload for an order header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub payment_status: PaymentStatus,
    /// `None` stamps the current time.
    pub placed_at: Option<i64>,
}

impl NewOrder {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            payment_status: PaymentStatus::default(),
            placed_at: None,
        }
    }
}

/// Order line with its product loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    #[serde(flatten)]
    pub item: OrderItem,
    pub product: Product,
}

/// Order with its customer and every line's product loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Customer,
    pub items: Vec<OrderLine>,
}

impl OrderDetail {
    pub fn total(&self) -> Money {
        Money::from_cents(self.items.iter().map(|line| line.item.line_total().cents()).sum())
    }
}
