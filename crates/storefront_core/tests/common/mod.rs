#![allow(dead_code)]

use rusqlite::Connection;
use storefront_core::model::collection::{CollectionId, NewCollection};
use storefront_core::model::customer::{CustomerId, NewCustomer};
use storefront_core::model::money::Money;
use storefront_core::model::order::{NewOrder, NewOrderItem, OrderId};
use storefront_core::model::product::{NewProduct, ProductId};
use storefront_core::repo::collection_repo::{CollectionRepository, SqliteCollectionRepository};
use storefront_core::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
use storefront_core::repo::order_repo::{OrderRepository, SqliteOrderRepository};
use storefront_core::repo::product_repo::{ProductRepository, SqliteProductRepository};

/// 2024-03-15 13:20:00 UTC.
pub const NOW_MS: i64 = 1_710_508_800_000;
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub fn collection(conn: &Connection, title: &str) -> CollectionId {
    SqliteCollectionRepository::new(conn)
        .create_collection(&NewCollection::new(title))
        .unwrap()
}

pub fn product(
    conn: &Connection,
    title: &str,
    price_cents: i64,
    inventory: u32,
    collection_id: CollectionId,
) -> ProductId {
    SqliteProductRepository::new(conn)
        .create_product(&NewProduct::new(
            title,
            Money::from_cents(price_cents),
            inventory,
            collection_id,
        ))
        .unwrap()
}

pub fn customer(conn: &Connection, first_name: &str, last_name: &str) -> CustomerId {
    let email = format!(
        "{}.{}@example.com",
        first_name.to_lowercase(),
        last_name.to_lowercase()
    );
    SqliteCustomerRepository::new(conn)
        .create_customer(&NewCustomer::new(first_name, last_name, email))
        .unwrap()
}

pub fn order(
    conn: &mut Connection,
    customer_id: CustomerId,
    placed_at: i64,
    lines: &[(ProductId, u32)],
) -> OrderId {
    let mut header = NewOrder::new(customer_id);
    header.placed_at = Some(placed_at);
    let items = lines
        .iter()
        .map(|(product_id, quantity)| NewOrderItem::new(*product_id, *quantity))
        .collect::<Vec<_>>();
    SqliteOrderRepository::new(conn)
        .create_order(&header, &items)
        .unwrap()
}

pub fn set_last_update(conn: &Connection, product_id: ProductId, last_update: i64) {
    conn.execute(
        "UPDATE products SET last_update = ?1 WHERE id = ?2;",
        [last_update, product_id],
    )
    .unwrap();
}

pub fn inventory_of(conn: &Connection, product_id: ProductId) -> u32 {
    conn.query_row(
        "SELECT inventory FROM products WHERE id = ?1;",
        [product_id],
        |row| row.get(0),
    )
    .unwrap()
}
