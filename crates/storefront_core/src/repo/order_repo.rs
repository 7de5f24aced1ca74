//! Order repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist order headers together with their lines atomically.
//! - Load fully-populated [`OrderDetail`] graphs for reports and admin views.
//!
//! # Invariants
//! - Detail loading issues exactly two queries regardless of row count: one
//!   for orders joined to customers, one for all their lines joined to
//!   products.
//! - Detail lists are sorted by `placed_at DESC, id DESC`; lines by `id ASC`.
//! - An order and its lines are written in a single transaction.

use crate::model::money::Money;
use crate::model::order::{
    NewOrder, NewOrderItem, Order, OrderDetail, OrderId, OrderItem, OrderLine, PaymentStatus,
};
use crate::model::product::ProductId;
use crate::repo::customer_repo::parse_customer_row;
use crate::repo::product_repo::parse_product_row;
use crate::repo::{id_values, now_epoch_ms, placeholders, to_u32, RepoError, RepoResult};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};
use std::collections::HashMap;

const ORDER_WITH_CUSTOMER_SELECT_SQL: &str = "SELECT
    o.id AS id,
    o.placed_at AS placed_at,
    o.payment_status AS payment_status,
    o.customer_id AS customer_id,
    c.id AS c_id,
    c.first_name AS c_first_name,
    c.last_name AS c_last_name,
    c.email AS c_email,
    c.phone AS c_phone,
    c.birth_date AS c_birth_date,
    c.membership AS c_membership
FROM orders o
INNER JOIN customers c ON c.id = o.customer_id";

const LINE_WITH_PRODUCT_SELECT_SQL: &str = "SELECT
    i.id AS id,
    i.order_id AS order_id,
    i.product_id AS product_id,
    i.quantity AS quantity,
    i.unit_price AS unit_price,
    p.id AS p_id,
    p.title AS p_title,
    p.slug AS p_slug,
    p.description AS p_description,
    p.unit_price AS p_unit_price,
    p.inventory AS p_inventory,
    p.last_update AS p_last_update,
    p.collection_id AS p_collection_id
FROM order_items i
INNER JOIN products p ON p.id = i.product_id";

/// Repository interface for orders and their lines.
pub trait OrderRepository {
    /// Inserts an order and all of its lines in one transaction.
    fn create_order(&mut self, order: &NewOrder, items: &[NewOrderItem]) -> RepoResult<OrderId>;
    /// Replaces every line of an existing order in one transaction.
    fn replace_order_items(&mut self, order_id: OrderId, items: &[NewOrderItem])
        -> RepoResult<()>;
    fn get_order_detail(&self, order_id: OrderId) -> RepoResult<Option<OrderDetail>>;
    /// Returns up to `limit` orders, newest first, fully loaded.
    fn list_recent_orders(&self, limit: u32) -> RepoResult<Vec<OrderDetail>>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&mut self, order: &NewOrder, items: &[NewOrderItem]) -> RepoResult<OrderId> {
        for item in items {
            item.validate()?;
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO orders (placed_at, payment_status, customer_id) VALUES (?1, ?2, ?3);",
            params![
                order.placed_at.unwrap_or_else(now_epoch_ms),
                order.payment_status.code(),
                order.customer_id,
            ],
        )?;
        let order_id = tx.last_insert_rowid();
        insert_items_in_tx(&tx, order_id, items)?;
        tx.commit()?;

        Ok(order_id)
    }

    fn replace_order_items(
        &mut self,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> RepoResult<()> {
        for item in items {
            item.validate()?;
        }

        let tx = self.conn.transaction()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?1);",
            [order_id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound {
                model: "order",
                id: order_id,
            });
        }

        tx.execute("DELETE FROM order_items WHERE order_id = ?1;", [order_id])?;
        insert_items_in_tx(&tx, order_id, items)?;
        tx.commit()?;
        Ok(())
    }

    fn get_order_detail(&self, order_id: OrderId) -> RepoResult<Option<OrderDetail>> {
        let mut details = load_order_details(
            self.conn,
            "WHERE o.id = ?",
            vec![Value::Integer(order_id)],
        )?;
        Ok(details.pop())
    }

    fn list_recent_orders(&self, limit: u32) -> RepoResult<Vec<OrderDetail>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        load_order_details(
            self.conn,
            "ORDER BY o.placed_at DESC, o.id DESC LIMIT ?",
            vec![Value::Integer(i64::from(limit))],
        )
    }
}

fn insert_items_in_tx(
    tx: &Transaction<'_>,
    order_id: OrderId,
    items: &[NewOrderItem],
) -> RepoResult<()> {
    for item in items {
        let unit_price = match item.unit_price {
            Some(price) => price,
            None => current_product_price(tx, item.product_id)?,
        };
        tx.execute(
            "INSERT INTO order_items (order_id, product_id, quantity, unit_price)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                order_id,
                item.product_id,
                i64::from(item.quantity),
                unit_price.cents(),
            ],
        )?;
    }
    Ok(())
}

fn current_product_price(tx: &Transaction<'_>, product_id: ProductId) -> RepoResult<Money> {
    let cents: Option<i64> = tx
        .query_row(
            "SELECT unit_price FROM products WHERE id = ?1;",
            [product_id],
            |row| row.get(0),
        )
        .optional()?;
    cents.map(Money::from_cents).ok_or(RepoError::NotFound {
        model: "product",
        id: product_id,
    })
}

/// Loads orders with customers, then every line of those orders with its
/// product, and stitches them together.
fn load_order_details(
    conn: &Connection,
    tail_sql: &str,
    bind_values: Vec<Value>,
) -> RepoResult<Vec<OrderDetail>> {
    let mut stmt = conn.prepare(&format!("{ORDER_WITH_CUSTOMER_SELECT_SQL} {tail_sql};"))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut headers = Vec::new();
    while let Some(row) = rows.next()? {
        headers.push((parse_order_row(row)?, parse_customer_row(row, "c_")?));
    }

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<OrderId> = headers.iter().map(|(order, _)| order.id).collect();
    let mut lines_by_order = load_lines(conn, &order_ids)?;
    debug!(
        "event=order_detail_load module=repo status=ok orders={} queries=2",
        headers.len()
    );

    Ok(headers
        .into_iter()
        .map(|(order, customer)| {
            let items = lines_by_order.remove(&order.id).unwrap_or_default();
            OrderDetail {
                order,
                customer,
                items,
            }
        })
        .collect())
}

fn load_lines(conn: &Connection, order_ids: &[OrderId]) -> RepoResult<HashMap<OrderId, Vec<OrderLine>>> {
    let sql = format!(
        "{LINE_WITH_PRODUCT_SELECT_SQL} WHERE i.order_id IN ({}) ORDER BY i.id ASC;",
        placeholders(order_ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(id_values(order_ids)))?;
    let mut lines: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let item = parse_order_item_row(row)?;
        let product = parse_product_row(row, "p_")?;
        lines
            .entry(item.order_id)
            .or_default()
            .push(OrderLine { item, product });
    }
    Ok(lines)
}

fn parse_order_row(row: &Row<'_>) -> RepoResult<Order> {
    let status_code: String = row.get("payment_status")?;
    let payment_status = PaymentStatus::from_code(&status_code).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid payment status `{status_code}` in orders.payment_status"
        ))
    })?;

    Ok(Order {
        id: row.get("id")?,
        placed_at: row.get("placed_at")?,
        payment_status,
        customer_id: row.get("customer_id")?,
    })
}

fn parse_order_item_row(row: &Row<'_>) -> RepoResult<OrderItem> {
    let quantity: i64 = row.get("quantity")?;
    let quantity = to_u32("order_items.quantity", quantity)?;
    if quantity == 0 {
        return Err(RepoError::InvalidData(
            "invalid quantity `0` in order_items.quantity".to_string(),
        ));
    }

    Ok(OrderItem {
        id: row.get("id")?,
        order_id: row.get("order_id")?,
        product_id: row.get("product_id")?,
        quantity,
        unit_price: Money::from_cents(row.get("unit_price")?),
    })
}
