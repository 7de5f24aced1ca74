//! Order change-form service.
//!
//! # Responsibility
//! - Save an order header together with its inline item rows.
//! - Enforce the inline formset bounds declared on the order admin before
//!   anything is written.
//!
//! # Invariants
//! - Rows marked for deletion do not count toward the formset bounds.
//! - A rejected submission writes nothing.
//! - Successful saves return the order read back with customer and products.

use crate::admin::{AdminError, InlineAdmin, InlineFormsetError, ModelAdmin};
use crate::model::order::{NewOrder, NewOrderItem, OrderDetail, OrderId};
use crate::model::ModelKind;
use crate::repo::order_repo::OrderRepository;
use crate::repo::RepoError;
use log::info;
use thiserror::Error;

/// Service error for order change-form saves.
#[derive(Debug, Error)]
pub enum OrderAdminError {
    #[error(transparent)]
    Formset(#[from] InlineFormsetError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("inconsistent order state: {0}")]
    InconsistentState(&'static str),
}

/// One submitted inline row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRow {
    pub item: NewOrderItem,
    /// The row's "delete" checkbox.
    pub delete: bool,
}

impl InlineRow {
    pub fn keep(item: NewOrderItem) -> Self {
        Self {
            item,
            delete: false,
        }
    }

    pub fn delete(item: NewOrderItem) -> Self {
        Self { item, delete: true }
    }
}

/// Order change-form facade over an order repository.
pub struct OrderAdminService<R: OrderRepository> {
    repo: R,
    inline: InlineAdmin,
}

impl<R: OrderRepository> OrderAdminService<R> {
    /// Creates a service bound to the order-item inline of `admin`.
    pub fn new(repo: R, admin: &ModelAdmin) -> Result<Self, OrderAdminError> {
        let inline = admin
            .inline_for(ModelKind::OrderItem)
            .cloned()
            .ok_or(AdminError::NotRegistered(ModelKind::OrderItem))?;
        Ok(Self { repo, inline })
    }

    /// Number of empty item rows the change form shows.
    pub fn blank_forms(&self, existing: usize) -> usize {
        self.inline.blank_forms(existing)
    }

    /// Validates the inline rows and inserts the order with its items.
    pub fn save_new_order(
        &mut self,
        order: &NewOrder,
        rows: &[InlineRow],
    ) -> Result<OrderDetail, OrderAdminError> {
        let items = self.kept_items(rows)?;
        let order_id = self.repo.create_order(order, &items)?;
        info!(
            "event=order_save module=service status=ok order_id={} items={}",
            order_id,
            items.len()
        );
        self.read_back(order_id)
    }

    /// Validates the inline rows and replaces an existing order's items.
    pub fn save_order_items(
        &mut self,
        order_id: OrderId,
        rows: &[InlineRow],
    ) -> Result<OrderDetail, OrderAdminError> {
        let items = self.kept_items(rows)?;
        self.repo
            .replace_order_items(order_id, &items)
            .map_err(|err| match err {
                RepoError::NotFound { model: "order", id } => OrderAdminError::OrderNotFound(id),
                other => OrderAdminError::Repo(other),
            })?;
        info!(
            "event=order_items_save module=service status=ok order_id={} items={}",
            order_id,
            items.len()
        );
        self.read_back(order_id)
    }

    pub fn order_detail(&self, order_id: OrderId) -> Result<OrderDetail, OrderAdminError> {
        self.repo
            .get_order_detail(order_id)?
            .ok_or(OrderAdminError::OrderNotFound(order_id))
    }

    fn kept_items(&self, rows: &[InlineRow]) -> Result<Vec<NewOrderItem>, OrderAdminError> {
        let items: Vec<NewOrderItem> = rows
            .iter()
            .filter(|row| !row.delete)
            .map(|row| row.item.clone())
            .collect();
        self.inline.validate_count(items.len())?;
        Ok(items)
    }

    fn read_back(&self, order_id: OrderId) -> Result<OrderDetail, OrderAdminError> {
        self.repo
            .get_order_detail(order_id)?
            .ok_or(OrderAdminError::InconsistentState(
                "saved order not found in read-back",
            ))
    }
}
