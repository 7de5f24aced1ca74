//! Admin registration for tags.

use super::changelist::{ChangeListParams, ChangeListSource, ListRow};
use super::display::Cell;
use super::filters::ListFilter;
use super::options::ModelAdmin;
use super::site::AdminSite;
use super::AdminResult;
use crate::model::tag::TagId;
use crate::model::ModelKind;
use crate::repo::{to_u32, RepoResult};
use rusqlite::Row;

/// Tag admin; searchable by label so other admins can autocomplete tags.
pub fn tag_admin() -> ModelAdmin {
    ModelAdmin::new(ModelKind::Tag)
        .with_list_display(&["label", "tagged_count"])
        .with_search_fields(&["label"])
        .with_ordering(&["label"])
}

pub fn register(site: &mut AdminSite) -> AdminResult<()> {
    site.register(tag_admin())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub id: TagId,
    pub label: String,
    /// Records currently carrying this tag.
    pub tagged_count: u32,
}

impl ListRow for TagRow {
    fn pk(&self) -> i64 {
        self.id
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn cell(&self, column: &str) -> Option<Cell> {
        match column {
            "id" => Some(Cell::text(self.id)),
            "label" => Some(Cell::text(&self.label)),
            "tagged_count" => Some(Cell::text(self.tagged_count)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagChangeList;

impl ChangeListSource for TagChangeList {
    type Row = TagRow;

    fn model(&self) -> ModelKind {
        ModelKind::Tag
    }

    fn select_sql(&self) -> &'static str {
        "SELECT
            t.id AS id,
            t.label AS label,
            COUNT(ti.id) AS tagged_count
         FROM tags t
         LEFT JOIN tagged_items ti ON ti.tag_id = t.id"
    }

    fn group_by_sql(&self) -> Option<&'static str> {
        Some("t.id")
    }

    fn column_sql(&self, field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("t.id"),
            "label" => Some("t.label"),
            _ => None,
        }
    }

    fn sort_sql(&self, column: &str) -> Option<&'static str> {
        match column {
            "tagged_count" => Some("tagged_count"),
            other => self.column_sql(other),
        }
    }

    fn filter(&self, _name: &str, _params: &ChangeListParams) -> Option<Box<dyn ListFilter>> {
        None
    }

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<TagRow> {
        Ok(TagRow {
            id: row.get("id")?,
            label: row.get("label")?,
            tagged_count: to_u32("tagged_count", row.get("tagged_count")?)?,
        })
    }
}
