//! Admin registrations for the store models.
//!
//! # Responsibility
//! - Declare product, customer, order and collection admins.
//! - Back each declaration with a change-list source and row type.
//! - Apply list-editable saves for product prices and customer tiers.

use super::actions::ClearInventoryAction;
use super::changelist::{ChangeListParams, ChangeListSource, ListRow};
use super::display::{format_timestamp, inventory_status, products_count_link, Cell};
use super::filters::{CollectionFilter, DateFieldFilter, InventoryFilter, ListFilter};
use super::inline::InlineAdmin;
use super::options::ModelAdmin;
use super::site::{AdminSite, ListEdit};
use super::{AdminError, AdminResult};
use crate::model::collection::CollectionId;
use crate::model::customer::{CustomerId, Membership};
use crate::model::money::Money;
use crate::model::order::{OrderId, PaymentStatus};
use crate::model::product::ProductId;
use crate::model::ModelKind;
use crate::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use crate::repo::product_repo::{ProductRepository, SqliteProductRepository};
use crate::repo::{to_u32, RepoError, RepoResult};
use rusqlite::{Connection, Row};

/// Product admin: priced, filterable, with the clear-inventory action.
pub fn product_admin() -> ModelAdmin {
    ModelAdmin::new(ModelKind::Product)
        .with_actions(&[ClearInventoryAction::NAME])
        .with_autocomplete_fields(&["collection"])
        .with_list_display(&["title", "unit_price", "inventory_status", "collection_title"])
        .with_list_editable(&["unit_price"])
        .with_list_per_page(20)
        .with_list_select_related(&["collection"])
        .with_list_filter(&["collection", "last_update", "inventory"])
        .with_prepopulated_field("slug", &["title"])
        .with_search_fields(&["title"])
}

pub fn customer_admin() -> ModelAdmin {
    ModelAdmin::new(ModelKind::Customer)
        .with_list_display(&["first_name", "last_name", "membership"])
        .with_list_editable(&["membership"])
        .with_list_per_page(10)
        .with_ordering(&["first_name", "last_name"])
        .with_search_fields(&["first_name__istartswith", "last_name__istartswith"])
}

/// Order admin. Its item inline admits exactly one line per order.
pub fn order_admin() -> ModelAdmin {
    ModelAdmin::new(ModelKind::Order)
        .with_autocomplete_fields(&["customer"])
        .with_inline(
            InlineAdmin::new(ModelKind::OrderItem, "order")
                .with_autocomplete_fields(&["product"])
                .with_extra(0)
                .with_min_num(1)
                .with_max_num(1),
        )
        .with_list_display(&["id", "placed_at", "customer"])
}

pub fn collection_admin() -> ModelAdmin {
    ModelAdmin::new(ModelKind::Collection)
        .with_list_display(&["title", "products_count"])
        .with_search_fields(&["title"])
}

/// Registers every store admin and the actions they reference.
pub fn register(site: &mut AdminSite) -> AdminResult<()> {
    site.register_action(Box::new(ClearInventoryAction));
    site.register(product_admin())?;
    site.register(customer_admin())?;
    site.register(order_admin())?;
    site.register(collection_admin())?;
    Ok(())
}

/// Product change-list row, with its collection title selected alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub unit_price: Money,
    pub inventory: u32,
    pub last_update: i64,
    pub collection_id: CollectionId,
    pub collection_title: String,
}

impl ListRow for ProductRow {
    fn pk(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(Cell::text(self.id)),
            "title" => Some(Cell::text(&self.title)),
            "slug" => Some(Cell::text(&self.slug)),
            "unit_price" => Some(Cell::text(self.unit_price)),
            "inventory" => Some(Cell::text(self.inventory)),
            "inventory_status" => Some(Cell::text(inventory_status(self.inventory))),
            "last_update" => Some(Cell::text(format_timestamp(self.last_update))),
            "collection_title" | "collection" => Some(Cell::text(&self.collection_title)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProductChangeList;

impl ChangeListSource for ProductChangeList {
    type Row = ProductRow;

    fn model(&self) -> ModelKind {
        ModelKind::Product
    }

    fn select_sql(&self) -> &'static str {
        "SELECT
            p.id AS id,
            p.title AS title,
            p.slug AS slug,
            p.unit_price AS unit_price,
            p.inventory AS inventory,
            p.last_update AS last_update,
            p.collection_id AS collection_id,
            c.title AS collection_title
         FROM products p
         INNER JOIN collections c ON c.id = p.collection_id"
    }

    fn column_sql(&self, field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("p.id"),
            "title" => Some("p.title"),
            "slug" => Some("p.slug"),
            "description" => Some("p.description"),
            "unit_price" => Some("p.unit_price"),
            "inventory" => Some("p.inventory"),
            "last_update" => Some("p.last_update"),
            "collection" => Some("p.collection_id"),
            _ => None,
        }
    }

    fn sort_sql(&self, column: &str) -> Option<&'static str> {
        match column {
            // Status labels sort by the raw inventory they derive from.
            "inventory_status" => Some("p.inventory"),
            "collection_title" => None,
            other => self.column_sql(other),
        }
    }

    fn filter(&self, name: &str, params: &ChangeListParams) -> Option<Box<dyn ListFilter>> {
        match name {
            "collection" => Some(Box::new(CollectionFilter::new("p.collection_id"))),
            "last_update" => Some(Box::new(DateFieldFilter::new(
                "last_update",
                "p.last_update",
                params.now_ms,
            ))),
            "inventory" => Some(Box::new(InventoryFilter::new("p.inventory"))),
            _ => None,
        }
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<ProductRow> {
        Ok(ProductRow {
            id: row.get("id")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            unit_price: Money::from_cents(row.get("unit_price")?),
            inventory: to_u32("products.inventory", row.get("inventory")?)?,
            last_update: row.get("last_update")?,
            collection_id: row.get("collection_id")?,
            collection_title: row.get("collection_title")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub membership: Membership,
}

impl ListRow for CustomerRow {
    fn pk(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(Cell::text(self.id)),
            "first_name" => Some(Cell::text(&self.first_name)),
            "last_name" => Some(Cell::text(&self.last_name)),
            "email" => Some(Cell::text(&self.email)),
            "membership" => Some(Cell::text(self.membership.label())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerChangeList;

impl ChangeListSource for CustomerChangeList {
    type Row = CustomerRow;

    fn model(&self) -> ModelKind {
        ModelKind::Customer
    }

    fn select_sql(&self) -> &'static str {
        "SELECT
            cu.id AS id,
            cu.first_name AS first_name,
            cu.last_name AS last_name,
            cu.email AS email,
            cu.membership AS membership
         FROM customers cu"
    }

    fn column_sql(&self, field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("cu.id"),
            "first_name" => Some("cu.first_name"),
            "last_name" => Some("cu.last_name"),
            "email" => Some("cu.email"),
            "phone" => Some("cu.phone"),
            "birth_date" => Some("cu.birth_date"),
            "membership" => Some("cu.membership"),
            _ => None,
        }
    }

    fn filter(&self, _name: &str, _params: &ChangeListParams) -> Option<Box<dyn ListFilter>> {
        None
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<CustomerRow> {
        let code: String = row.get("membership")?;
        let membership = Membership::from_code(&code).map_err(|_| {
            RepoError::InvalidData(format!("invalid membership `{code}` in customers.membership"))
        })?;
        Ok(CustomerRow {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            membership,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: OrderId,
    pub placed_at: i64,
    pub payment_status: PaymentStatus,
    pub customer_id: CustomerId,
    pub customer_name: String,
}

impl ListRow for OrderRow {
    fn pk(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        format!("Order {}", self.id)
    }

    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(Cell::text(self.id)),
            "placed_at" => Some(Cell::text(format_timestamp(self.placed_at))),
            "payment_status" => Some(Cell::text(self.payment_status.label())),
            "customer" => Some(Cell::text(&self.customer_name)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderChangeList;

impl ChangeListSource for OrderChangeList {
    type Row = OrderRow;

    fn model(&self) -> ModelKind {
        ModelKind::Order
    }

    fn select_sql(&self) -> &'static str {
        "SELECT
            o.id AS id,
            o.placed_at AS placed_at,
            o.payment_status AS payment_status,
            o.customer_id AS customer_id,
            cu.first_name || ' ' || cu.last_name AS customer_name
         FROM orders o
         INNER JOIN customers cu ON cu.id = o.customer_id"
    }

    fn column_sql(&self, field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("o.id"),
            "placed_at" => Some("o.placed_at"),
            "payment_status" => Some("o.payment_status"),
            "customer" => Some("o.customer_id"),
            _ => None,
        }
    }

    fn sort_sql(&self, column: &str) -> Option<&'static str> {
        match column {
            "customer" => Some("customer_name"),
            other => self.column_sql(other),
        }
    }

    fn filter(&self, _name: &str, _params: &ChangeListParams) -> Option<Box<dyn ListFilter>> {
        None
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<OrderRow> {
        let code: String = row.get("payment_status")?;
        let payment_status = PaymentStatus::from_code(&code).map_err(|_| {
            RepoError::InvalidData(format!("invalid payment status `{code}` in orders.payment_status"))
        })?;
        Ok(OrderRow {
            id: row.get("id")?,
            placed_at: row.get("placed_at")?,
            payment_status,
            customer_id: row.get("customer_id")?,
            customer_name: row.get("customer_name")?,
        })
    }
}

/// Collection row annotated with its product count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRow {
    pub id: CollectionId,
    pub title: String,
    pub products_count: u32,
}

impl ListRow for CollectionRow {
    fn pk(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        self.title.clone()
    }

    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(Cell::text(self.id)),
            "title" => Some(Cell::text(&self.title)),
            "products_count" => Some(products_count_link(self.id, self.products_count)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionChangeList;

impl ChangeListSource for CollectionChangeList {
    type Row = CollectionRow;

    fn model(&self) -> ModelKind {
        ModelKind::Collection
    }

    fn select_sql(&self) -> &'static str {
        "SELECT
            c.id AS id,
            c.title AS title,
            COUNT(p.id) AS products_count
         FROM collections c
         LEFT JOIN products p ON p.collection_id = c.id"
    }

    fn group_by_sql(&self) -> Option<&'static str> {
        Some("c.id")
    }

    fn column_sql(&self, field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("c.id"),
            "title" => Some("c.title"),
            "featured_product" => Some("c.featured_product_id"),
            _ => None,
        }
    }

    fn sort_sql(&self, column: &str) -> Option<&'static str> {
        match column {
            "products_count" => Some("products_count"),
            other => self.column_sql(other),
        }
    }

    fn filter(&self, _name: &str, _params: &ChangeListParams) -> Option<Box<dyn ListFilter>> {
        None
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<CollectionRow> {
        Ok(CollectionRow {
            id: row.get("id")?,
            title: row.get("title")?,
            products_count: to_u32("products_count", row.get("products_count")?)?,
        })
    }
}

/// Applies one list-editable cell change.
pub(crate) fn apply_list_edit(
    conn: &Connection,
    model: ModelKind,
    edit: &ListEdit,
) -> AdminResult<()> {
    let invalid = || AdminError::InvalidValue {
        column: edit.column.clone(),
        value: edit.value.clone(),
    };

    match (model, edit.column.as_str()) {
        (ModelKind::Product, "unit_price") => {
            let price = Money::parse(&edit.value).ok_or_else(invalid)?;
            SqliteProductRepository::new(conn).set_unit_price(edit.pk, price)?;
        }
        (ModelKind::Customer, "membership") => {
            let membership = parse_membership(&edit.value).ok_or_else(invalid)?;
            SqliteCustomerRepository::new(conn).set_membership(edit.pk, membership)?;
        }
        _ => {
            return Err(AdminError::NotEditable {
                model,
                column: edit.column.clone(),
            })
        }
    }
    Ok(())
}

fn parse_membership(value: &str) -> Option<Membership> {
    let value = value.trim();
    Membership::ALL
        .into_iter()
        .find(|tier| tier.code() == value || tier.label().eq_ignore_ascii_case(value))
}
