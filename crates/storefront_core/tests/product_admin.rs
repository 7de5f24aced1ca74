mod common;

use common::{collection, inventory_of, product, set_last_update, DAY_MS, NOW_MS};
use rusqlite::Connection;
use std::collections::BTreeSet;
use storefront_core::admin::store::ProductChangeList;
use storefront_core::admin::{
    AdminError, AdminSite, ChangeListParams, ClearInventoryAction, ListEdit, MessageLevel,
};
use storefront_core::db::open_db_in_memory;
use storefront_core::model::ModelKind;

struct Catalog {
    drinks: i64,
    snacks: i64,
    /// `(id, inventory)` in insertion order.
    products: Vec<(i64, u32)>,
}

fn seed(conn: &Connection) -> Catalog {
    let drinks = collection(conn, "Drinks");
    let snacks = collection(conn, "Snacks");
    let rows = [
        ("Green Tea", 450, 0, drinks),
        ("Coffee Beans", 1299, 9, drinks),
        ("Sparkling Water", 199, 10, drinks),
        ("Oat Crackers", 325, 3, snacks),
        ("Dark Chocolate", 550, 120, snacks),
        ("Trail Mix", 799, 11, snacks),
    ];
    let products = rows
        .iter()
        .map(|(title, cents, inventory, collection_id)| {
            (
                product(conn, title, *cents, *inventory, *collection_id),
                *inventory,
            )
        })
        .collect();
    Catalog {
        drinks,
        snacks,
        products,
    }
}

fn site() -> AdminSite {
    AdminSite::with_default_admins().unwrap()
}

#[test]
fn low_filter_selects_exactly_products_below_ten() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let params = ChangeListParams::from_query_string("inventory=%3C10", NOW_MS).unwrap();

    let page = site().changelist(&conn, &ProductChangeList, &params).unwrap();

    let expected = catalog
        .products
        .iter()
        .filter(|(_, inventory)| *inventory < 10)
        .map(|(id, _)| *id)
        .collect::<BTreeSet<_>>();
    assert_eq!(page.pks().into_iter().collect::<BTreeSet<_>>(), expected);
    assert_eq!(page.total_count, 3);
    assert!(page.rows.iter().all(|row| row.inventory < 10));
}

#[test]
fn inventory_filter_panel_offers_low_choice() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let params = ChangeListParams::new(NOW_MS).with_filter("inventory", "<10");

    let page = site().changelist(&conn, &ProductChangeList, &params).unwrap();
    let panel = page
        .filters
        .iter()
        .find(|panel| panel.title == "inventory")
        .unwrap();
    assert_eq!(panel.choices.len(), 1);
    assert_eq!(panel.choices[0].value, "<10");
    assert_eq!(panel.choices[0].label, "LOW");
    assert_eq!(panel.selected.as_deref(), Some("<10"));
}

#[test]
fn inventory_status_cells_follow_threshold() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let page = site()
        .changelist(&conn, &ProductChangeList, &ChangeListParams::new(NOW_MS))
        .unwrap();
    let status_index = page
        .columns
        .iter()
        .position(|column| *column == "inventory_status")
        .unwrap();
    for (row, cells) in page.rows.iter().zip(page.cells()) {
        let expected = if row.inventory < 10 { "Low" } else { "OK" };
        assert_eq!(cells[status_index].plain(), expected);
    }
}

#[test]
fn sorting_by_status_matches_sorting_by_inventory() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let ascending = site()
        .changelist(
            &conn,
            &ProductChangeList,
            &ChangeListParams::new(NOW_MS).with_ordering("inventory_status"),
        )
        .unwrap();
    let inventories = ascending.rows.iter().map(|row| row.inventory).collect::<Vec<_>>();
    assert_eq!(inventories, vec![0, 3, 9, 10, 11, 120]);

    let descending = site()
        .changelist(
            &conn,
            &ProductChangeList,
            &ChangeListParams::new(NOW_MS).with_ordering("-inventory_status"),
        )
        .unwrap();
    let inventories = descending.rows.iter().map(|row| row.inventory).collect::<Vec<_>>();
    assert_eq!(inventories, vec![120, 11, 10, 9, 3, 0]);
}

#[test]
fn collection_title_column_is_not_sortable() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let err = site()
        .changelist(
            &conn,
            &ProductChangeList,
            &ChangeListParams::new(NOW_MS).with_ordering("collection_title"),
        )
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidOrdering { .. }));
}

#[test]
fn rows_carry_their_collection_title() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);

    let page = site()
        .changelist(&conn, &ProductChangeList, &ChangeListParams::new(NOW_MS))
        .unwrap();
    for row in &page.rows {
        let expected = if row.collection_id == catalog.drinks {
            "Drinks"
        } else {
            "Snacks"
        };
        assert_eq!(row.collection_title, expected);
    }
}

#[test]
fn search_matches_title_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let page = site()
        .changelist(
            &conn,
            &ProductChangeList,
            &ChangeListParams::new(NOW_MS).with_search("TEA"),
        )
        .unwrap();
    let titles = page.rows.iter().map(|row| row.title.as_str()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["Green Tea"]);
}

#[test]
fn collection_and_date_filters_combine() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    for (id, _) in &catalog.products {
        set_last_update(&conn, *id, NOW_MS - 30 * DAY_MS);
    }
    let (fresh, _) = catalog.products[4];
    set_last_update(&conn, fresh, NOW_MS - DAY_MS);

    let query = format!("collection__id__exact={}&last_update=past_7_days", catalog.snacks);
    let params = ChangeListParams::from_query_string(&query, NOW_MS).unwrap();
    let page = site().changelist(&conn, &ProductChangeList, &params).unwrap();
    assert_eq!(page.pks(), vec![fresh]);
}

#[test]
fn unknown_filter_parameter_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let params = ChangeListParams::from_query_string("colour=red", NOW_MS).unwrap();

    let err = site()
        .changelist(&conn, &ProductChangeList, &params)
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidLookup { parameter, .. } if parameter == "colour"));
}

#[test]
fn products_page_twenty_at_a_time() {
    let conn = open_db_in_memory().unwrap();
    let bulk = collection(&conn, "Bulk");
    for index in 0..45 {
        product(&conn, &format!("Item {index:02}"), 100, 50, bulk);
    }

    let third = site()
        .changelist(
            &conn,
            &ProductChangeList,
            &ChangeListParams::new(NOW_MS).with_page(3),
        )
        .unwrap();
    assert_eq!(third.num_pages, 3);
    assert_eq!(third.rows.len(), 5);
    assert_eq!(third.total_count, 45);

    let err = site()
        .changelist(
            &conn,
            &ProductChangeList,
            &ChangeListParams::new(NOW_MS).with_page(4),
        )
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidPage { page: 4, num_pages: 3 }));
}

#[test]
fn clear_inventory_zeroes_every_selected_product() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let selected = vec![catalog.products[1].0, catalog.products[4].0, catalog.products[5].0];

    let outcome = site()
        .run_action(&conn, ModelKind::Product, ClearInventoryAction::NAME, &selected)
        .unwrap();

    assert_eq!(outcome.affected, 3);
    assert_eq!(outcome.message.level, MessageLevel::Error);
    assert_eq!(outcome.message.text, "3 products were updated successfully");
    for id in &selected {
        assert_eq!(inventory_of(&conn, *id), 0);
    }
    assert_eq!(inventory_of(&conn, catalog.products[2].0), 10);
}

#[test]
fn clear_inventory_counts_only_existing_rows() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);

    let outcome = site()
        .run_action(
            &conn,
            ModelKind::Product,
            ClearInventoryAction::NAME,
            &[catalog.products[0].0, 9_999],
        )
        .unwrap();
    assert_eq!(outcome.affected, 1);
    assert_eq!(outcome.message.text, "1 products were updated successfully");
}

#[test]
fn clear_inventory_accepts_selections_beyond_the_sqlite_variable_limit() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let mut selected = (100_000..140_000).collect::<Vec<i64>>();
    selected.push(catalog.products[0].0);
    selected.push(catalog.products[2].0);

    let outcome = site()
        .run_action(&conn, ModelKind::Product, ClearInventoryAction::NAME, &selected)
        .unwrap();
    assert_eq!(outcome.affected, 2);
    assert_eq!(inventory_of(&conn, catalog.products[0].0), 0);
    assert_eq!(inventory_of(&conn, catalog.products[2].0), 0);
    assert_ne!(inventory_of(&conn, catalog.products[1].0), 0);
}

#[test]
fn actions_require_a_selection_and_a_declared_name() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);
    let site = site();

    let err = site
        .run_action(&conn, ModelKind::Product, ClearInventoryAction::NAME, &[])
        .unwrap_err();
    assert!(matches!(err, AdminError::EmptySelection));

    let err = site
        .run_action(&conn, ModelKind::Product, "delete_everything", &[1])
        .unwrap_err();
    assert!(matches!(err, AdminError::UnknownAction { .. }));

    let err = site
        .run_action(&conn, ModelKind::Customer, ClearInventoryAction::NAME, &[1])
        .unwrap_err();
    assert!(matches!(err, AdminError::UnknownAction { .. }));

    assert_eq!(
        site.action_choices(ModelKind::Product).unwrap(),
        vec![(ClearInventoryAction::NAME, "Clear inventory")]
    );
}

#[test]
fn unit_price_list_edits_save_together() {
    let mut conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let (tea, _) = catalog.products[0];
    let (coffee, _) = catalog.products[1];

    let saved = site()
        .save_list_edits(
            &mut conn,
            ModelKind::Product,
            &[ListEdit::new(tea, "unit_price", "4.99"), ListEdit::new(coffee, "unit_price", "12")],
        )
        .unwrap();
    assert_eq!(saved, 2);
    assert_eq!(price_of(&conn, tea), 499);
    assert_eq!(price_of(&conn, coffee), 1200);
}

#[test]
fn invalid_list_edit_rolls_back_the_submission() {
    let mut conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);
    let (tea, _) = catalog.products[0];
    let (coffee, _) = catalog.products[1];

    let err = site()
        .save_list_edits(
            &mut conn,
            ModelKind::Product,
            &[ListEdit::new(tea, "unit_price", "5.00"), ListEdit::new(coffee, "unit_price", "-1")],
        )
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidValue { .. }));
    assert_eq!(price_of(&conn, tea), 450);

    let err = site()
        .save_list_edits(
            &mut conn,
            ModelKind::Product,
            &[ListEdit::new(tea, "inventory", "5")],
        )
        .unwrap_err();
    assert!(matches!(err, AdminError::NotEditable { .. }));
}

#[test]
fn collection_autocomplete_searches_titles() {
    let conn = open_db_in_memory().unwrap();
    let catalog = seed(&conn);

    let items = site()
        .autocomplete(&conn, ModelKind::Product, "collection", "sna", NOW_MS)
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, catalog.snacks);
    assert_eq!(items[0].text, "Snacks");

    let err = site()
        .autocomplete(&conn, ModelKind::Product, "title", "x", NOW_MS)
        .unwrap_err();
    assert!(matches!(err, AdminError::NotAutocomplete { .. }));
}

fn price_of(conn: &Connection, product_id: i64) -> i64 {
    conn.query_row(
        "SELECT unit_price FROM products WHERE id = ?1;",
        [product_id],
        |row| row.get(0),
    )
    .unwrap()
}
