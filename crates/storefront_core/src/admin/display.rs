//! Derived display values for change-list cells.

use crate::model::collection::CollectionId;
use crate::model::product::LOW_INVENTORY_THRESHOLD;
use crate::model::ModelKind;
use chrono::{DateTime, Utc};
use url::form_urlencoded;

/// Rendered change-list cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Plain text; escaped when rendered.
    Text(String),
    /// Markup already escaped at construction.
    Html(String),
}

impl Cell {
    pub fn text(value: impl ToString) -> Self {
        Self::Text(value.to_string())
    }

    pub fn to_html(&self) -> String {
        match self {
            Self::Text(value) => tera::escape_html(value),
            Self::Html(markup) => markup.clone(),
        }
    }

    /// Visible text with markup stripped; used by plain-text renderers.
    pub fn plain(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Html(markup) => strip_tags(markup),
        }
    }
}

/// `"Low"` below the low-inventory threshold, `"OK"` otherwise.
pub fn inventory_status(inventory: u32) -> &'static str {
    if inventory < LOW_INVENTORY_THRESHOLD {
        "Low"
    } else {
        "OK"
    }
}

/// Admin change-list path for a model, e.g. `/admin/store/product/`.
pub fn changelist_url(model: ModelKind) -> String {
    format!("/admin/{}/{}/", model.app_label(), model.model_name())
}

/// Product change-list URL pre-filtered to one collection.
pub fn products_in_collection_url(collection_id: CollectionId) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("collection__id", &collection_id.to_string())
        .finish();
    format!("{}?{query}", changelist_url(ModelKind::Product))
}

/// Collection product count rendered as a link to the filtered product list.
pub fn products_count_link(collection_id: CollectionId, products_count: u32) -> Cell {
    Cell::Html(format!(
        "<a href=\"{}\">{}</a>",
        tera::escape_html(&products_in_collection_url(collection_id)),
        products_count
    ))
}

/// Formats epoch milliseconds as `YYYY-MM-DD HH:MM` in UTC.
pub fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn strip_tags(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::{
        format_timestamp, inventory_status, products_count_link, products_in_collection_url, Cell,
    };

    #[test]
    fn inventory_status_boundary_is_ten() {
        assert_eq!(inventory_status(0), "Low");
        assert_eq!(inventory_status(9), "Low");
        assert_eq!(inventory_status(10), "OK");
        assert_eq!(inventory_status(250), "OK");
    }

    #[test]
    fn products_count_link_points_at_filtered_product_list() {
        assert_eq!(
            products_in_collection_url(3),
            "/admin/store/product/?collection__id=3"
        );
        let cell = products_count_link(3, 12);
        let html = cell.to_html();
        assert!(html.starts_with("<a href=\""));
        assert!(html.contains("product&#x2F;?collection__id=3\""));
        assert!(html.ends_with(">12</a>"));
        assert_eq!(cell.plain(), "12");
    }

    #[test]
    fn timestamps_render_in_utc_minutes() {
        assert_eq!(format_timestamp(1_710_508_800_000), "2024-03-15 13:20");
    }

    #[test]
    fn text_cells_are_escaped() {
        assert_eq!(Cell::text("<b>").to_html(), "&lt;b&gt;");
    }
}
