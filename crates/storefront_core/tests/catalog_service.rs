mod common;

use common::collection;
use std::collections::BTreeMap;
use storefront_core::admin::store::product_admin;
use storefront_core::db::open_db_in_memory;
use storefront_core::repo::product_repo::SqliteProductRepository;
use storefront_core::service::catalog_service::{CatalogError, CatalogService};

fn form(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

#[test]
fn blank_slug_is_prepopulated_from_title() {
    let conn = open_db_in_memory().unwrap();
    let drinks = collection(&conn, "Drinks").to_string();
    let admin = product_admin();
    let service = CatalogService::new(SqliteProductRepository::new(&conn), &admin);

    let product = service
        .create_product_from_form(form(&[
            ("title", "Maple Syrup, Grade A"),
            ("slug", ""),
            ("unit_price", "8.50"),
            ("inventory", "12"),
            ("collection", drinks.as_str()),
        ]))
        .unwrap();

    assert_eq!(product.slug, "maple-syrup-grade-a");
    assert_eq!(product.unit_price.cents(), 850);
    assert_eq!(product.inventory, 12);
    assert_eq!(product.description, None);
}

#[test]
fn explicit_slug_is_kept() {
    let conn = open_db_in_memory().unwrap();
    let drinks = collection(&conn, "Drinks").to_string();
    let admin = product_admin();
    let service = CatalogService::new(SqliteProductRepository::new(&conn), &admin);

    let product = service
        .create_product_from_form(form(&[
            ("title", "Maple Syrup"),
            ("slug", "syrup"),
            ("unit_price", "8"),
            ("inventory", "1"),
            ("collection", drinks.as_str()),
        ]))
        .unwrap();
    assert_eq!(product.slug, "syrup");
}

#[test]
fn malformed_fields_are_reported_by_name() {
    let conn = open_db_in_memory().unwrap();
    let drinks = collection(&conn, "Drinks").to_string();
    let admin = product_admin();
    let service = CatalogService::new(SqliteProductRepository::new(&conn), &admin);

    let err = service
        .create_product_from_form(form(&[
            ("title", "Maple Syrup"),
            ("unit_price", "eight"),
            ("inventory", "1"),
            ("collection", drinks.as_str()),
        ]))
        .unwrap_err();
    assert!(matches!(err, CatalogError::InvalidField { field: "unit_price", .. }));

    let err = service
        .create_product_from_form(form(&[("title", "Maple Syrup"), ("unit_price", "1")]))
        .unwrap_err();
    assert!(matches!(err, CatalogError::MissingField("collection")));
}
