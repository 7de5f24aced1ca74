mod common;

use common::{collection, product, NOW_MS};
use storefront_core::admin::tags::TagChangeList;
use storefront_core::admin::{AdminSite, ChangeListParams};
use storefront_core::db::open_db_in_memory;
use storefront_core::model::ModelKind;
use storefront_core::repo::tag_repo::{SqliteTagRepository, TagRepository};

#[test]
fn ensure_tag_reuses_labels_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTagRepository::new(&conn);

    let first = repo.ensure_tag("  Organic  ").unwrap();
    let second = repo.ensure_tag("organic").unwrap();
    assert_eq!(first, second);
    assert!(repo.ensure_tag("   ").is_err());
}

#[test]
fn tagging_is_idempotent_and_reversible() {
    let conn = open_db_in_memory().unwrap();
    let drinks = collection(&conn, "Drinks");
    let tea = product(&conn, "Green Tea", 450, 30, drinks);
    let repo = SqliteTagRepository::new(&conn);
    let organic = repo.ensure_tag("organic").unwrap();
    let hot = repo.ensure_tag("hot drinks").unwrap();
    let content_type = ModelKind::Product.model_name();

    repo.tag_object(organic, content_type, tea).unwrap();
    repo.tag_object(organic, content_type, tea).unwrap();
    repo.tag_object(hot, content_type, tea).unwrap();

    let labels = repo
        .tags_for_object(content_type, tea)
        .unwrap()
        .into_iter()
        .map(|item| item.tag.label)
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["hot drinks", "organic"]);

    assert!(repo.untag_object(organic, content_type, tea).unwrap());
    assert!(!repo.untag_object(organic, content_type, tea).unwrap());
    assert_eq!(repo.tags_for_object(content_type, tea).unwrap().len(), 1);
}

#[test]
fn tag_change_list_searches_labels_and_counts_uses() {
    let conn = open_db_in_memory().unwrap();
    let drinks = collection(&conn, "Drinks");
    let tea = product(&conn, "Green Tea", 450, 30, drinks);
    let coffee = product(&conn, "Coffee Beans", 1299, 4, drinks);
    let repo = SqliteTagRepository::new(&conn);
    let organic = repo.ensure_tag("organic").unwrap();
    repo.ensure_tag("fair trade").unwrap();
    repo.tag_object(organic, "product", tea).unwrap();
    repo.tag_object(organic, "product", coffee).unwrap();

    let site = AdminSite::with_default_admins().unwrap();
    let all = site
        .changelist(&conn, &TagChangeList, &ChangeListParams::new(NOW_MS))
        .unwrap();
    let labels = all.rows.iter().map(|row| row.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["fair trade", "organic"]);

    let searched = site
        .changelist(
            &conn,
            &TagChangeList,
            &ChangeListParams::new(NOW_MS).with_search("ORG"),
        )
        .unwrap();
    assert_eq!(searched.pks(), vec![organic]);
    assert_eq!(searched.rows[0].tagged_count, 2);
}
