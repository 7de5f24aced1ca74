mod common;

use common::{customer, NOW_MS};
use rusqlite::Connection;
use storefront_core::admin::store::CustomerChangeList;
use storefront_core::admin::{AdminError, AdminSite, ChangeListParams, ListEdit};
use storefront_core::db::open_db_in_memory;
use storefront_core::model::customer::Membership;
use storefront_core::model::ModelKind;
use storefront_core::repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};

fn seed(conn: &Connection) {
    customer(conn, "Grace", "Hopper");
    customer(conn, "Ada", "Lovelace");
    customer(conn, "Alan", "Turing");
    customer(conn, "Barbara", "Liskov");
    customer(conn, "Ada", "Byron");
}

fn names(conn: &Connection, params: &ChangeListParams) -> Vec<String> {
    AdminSite::with_default_admins()
        .unwrap()
        .changelist(conn, &CustomerChangeList, params)
        .unwrap()
        .rows
        .iter()
        .map(|row| format!("{} {}", row.first_name, row.last_name))
        .collect()
}

#[test]
fn customers_are_ordered_by_first_then_last_name() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    assert_eq!(
        names(&conn, &ChangeListParams::new(NOW_MS)),
        vec![
            "Ada Byron",
            "Ada Lovelace",
            "Alan Turing",
            "Barbara Liskov",
            "Grace Hopper"
        ]
    );
}

#[test]
fn search_matches_name_prefixes_only() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    assert_eq!(
        names(&conn, &ChangeListParams::new(NOW_MS).with_search("l")),
        vec!["Ada Lovelace", "Barbara Liskov"]
    );
    // "race" is inside "Grace" but is not a prefix.
    assert!(names(&conn, &ChangeListParams::new(NOW_MS).with_search("race")).is_empty());
    assert_eq!(
        names(&conn, &ChangeListParams::new(NOW_MS).with_search("ada lov")),
        vec!["Ada Lovelace"]
    );
}

#[test]
fn customers_page_ten_at_a_time() {
    let conn = open_db_in_memory().unwrap();
    for index in 0..12 {
        customer(&conn, &format!("Name{index:02}"), "Person");
    }

    let site = AdminSite::with_default_admins().unwrap();
    let second = site
        .changelist(
            &conn,
            &CustomerChangeList,
            &ChangeListParams::new(NOW_MS).with_page(2),
        )
        .unwrap();
    assert_eq!(second.per_page, 10);
    assert_eq!(second.num_pages, 2);
    assert_eq!(second.rows.len(), 2);
}

#[test]
fn membership_is_list_editable_by_code_or_label() {
    let mut conn = open_db_in_memory().unwrap();
    let grace = customer(&conn, "Grace", "Hopper");
    let alan = customer(&conn, "Alan", "Turing");

    let site = AdminSite::with_default_admins().unwrap();
    site.save_list_edits(
        &mut conn,
        ModelKind::Customer,
        &[ListEdit::new(grace, "membership", "G"), ListEdit::new(alan, "membership", "Silver")],
    )
    .unwrap();

    let repo = SqliteCustomerRepository::new(&conn);
    assert_eq!(repo.get_customer(grace).unwrap().unwrap().membership, Membership::Gold);
    assert_eq!(repo.get_customer(alan).unwrap().unwrap().membership, Membership::Silver);

    let page = site
        .changelist(&conn, &CustomerChangeList, &ChangeListParams::new(NOW_MS))
        .unwrap();
    let cells = page.cells();
    assert_eq!(cells[0][2].plain(), "Silver");
}

#[test]
fn unknown_membership_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let grace = customer(&conn, "Grace", "Hopper");

    let err = AdminSite::with_default_admins()
        .unwrap()
        .save_list_edits(
            &mut conn,
            ModelKind::Customer,
            &[ListEdit::new(grace, "membership", "Platinum")],
        )
        .unwrap_err();
    assert!(matches!(err, AdminError::InvalidValue { .. }));
}

#[test]
fn editing_a_missing_customer_fails_the_submission() {
    let mut conn = open_db_in_memory().unwrap();
    let grace = customer(&conn, "Grace", "Hopper");

    let err = AdminSite::with_default_admins()
        .unwrap()
        .save_list_edits(
            &mut conn,
            ModelKind::Customer,
            &[ListEdit::new(grace, "membership", "G"), ListEdit::new(999, "membership", "G")],
        )
        .unwrap_err();
    assert!(matches!(err, AdminError::Repo(_)));

    let repo = SqliteCustomerRepository::new(&conn);
    assert_eq!(repo.get_customer(grace).unwrap().unwrap().membership, Membership::Bronze);
}
