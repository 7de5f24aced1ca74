//! Declarative per-model admin options.

use super::inline::InlineAdmin;
use crate::model::product::slugify;
use crate::model::ModelKind;
use std::collections::BTreeMap;

/// Rows per change-list page when a declaration does not say otherwise.
pub const DEFAULT_LIST_PER_PAGE: u32 = 100;

/// Column shown when a declaration lists no display columns.
pub const STR_COLUMN: &str = "__str__";

/// Match rule applied to one search field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    IContains,
    IStartsWith,
    IExact,
    Exact,
}

impl Lookup {
    fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "icontains" => Some(Self::IContains),
            "istartswith" => Some(Self::IStartsWith),
            "iexact" => Some(Self::IExact),
            "exact" => Some(Self::Exact),
            _ => None,
        }
    }
}

/// One `search_fields` entry such as `first_name__istartswith`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchField {
    pub field: String,
    pub lookup: Lookup,
}

impl SearchField {
    /// Parses `field` or `field__lookup`; a bare field searches with `icontains`.
    pub fn parse(raw: &str) -> Self {
        if let Some((field, suffix)) = raw.rsplit_once("__") {
            if let Some(lookup) = Lookup::from_suffix(suffix) {
                return Self {
                    field: field.to_string(),
                    lookup,
                };
            }
        }
        Self {
            field: raw.to_string(),
            lookup: Lookup::IContains,
        }
    }
}

/// Admin declaration for one model.
#[derive(Debug, Clone)]
pub struct ModelAdmin {
    model: ModelKind,
    list_display: Vec<&'static str>,
    list_editable: Vec<&'static str>,
    list_per_page: u32,
    list_select_related: Vec<&'static str>,
    list_filter: Vec<&'static str>,
    search_fields: Vec<SearchField>,
    ordering: Vec<&'static str>,
    autocomplete_fields: Vec<&'static str>,
    prepopulated_fields: Vec<(&'static str, Vec<&'static str>)>,
    actions: Vec<&'static str>,
    inlines: Vec<InlineAdmin>,
}

impl ModelAdmin {
    pub fn new(model: ModelKind) -> Self {
        Self {
            model,
            list_display: vec![STR_COLUMN],
            list_editable: Vec::new(),
            list_per_page: DEFAULT_LIST_PER_PAGE,
            list_select_related: Vec::new(),
            list_filter: Vec::new(),
            search_fields: Vec::new(),
            ordering: Vec::new(),
            autocomplete_fields: Vec::new(),
            prepopulated_fields: Vec::new(),
            actions: Vec::new(),
            inlines: Vec::new(),
        }
    }

    pub fn with_list_display(mut self, columns: &[&'static str]) -> Self {
        self.list_display = columns.to_vec();
        self
    }

    pub fn with_list_editable(mut self, columns: &[&'static str]) -> Self {
        self.list_editable = columns.to_vec();
        self
    }

    pub fn with_list_per_page(mut self, per_page: u32) -> Self {
        self.list_per_page = per_page.max(1);
        self
    }

    pub fn with_list_select_related(mut self, relations: &[&'static str]) -> Self {
        self.list_select_related = relations.to_vec();
        self
    }

    pub fn with_list_filter(mut self, filters: &[&'static str]) -> Self {
        self.list_filter = filters.to_vec();
        self
    }

    pub fn with_search_fields(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|raw| SearchField::parse(raw)).collect();
        self
    }

    pub fn with_ordering(mut self, ordering: &[&'static str]) -> Self {
        self.ordering = ordering.to_vec();
        self
    }

    pub fn with_autocomplete_fields(mut self, fields: &[&'static str]) -> Self {
        self.autocomplete_fields = fields.to_vec();
        self
    }

    pub fn with_prepopulated_field(
        mut self,
        target: &'static str,
        sources: &[&'static str],
    ) -> Self {
        self.prepopulated_fields.push((target, sources.to_vec()));
        self
    }

    pub fn with_actions(mut self, actions: &[&'static str]) -> Self {
        self.actions = actions.to_vec();
        self
    }

    pub fn with_inline(mut self, inline: InlineAdmin) -> Self {
        self.inlines.push(inline);
        self
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    pub fn list_display(&self) -> &[&'static str] {
        &self.list_display
    }

    pub fn list_editable(&self) -> &[&'static str] {
        &self.list_editable
    }

    pub fn list_per_page(&self) -> u32 {
        self.list_per_page
    }

    pub fn list_select_related(&self) -> &[&'static str] {
        &self.list_select_related
    }

    pub fn list_filter(&self) -> &[&'static str] {
        &self.list_filter
    }

    pub fn search_fields(&self) -> &[SearchField] {
        &self.search_fields
    }

    pub fn ordering(&self) -> &[&'static str] {
        &self.ordering
    }

    pub fn autocomplete_fields(&self) -> &[&'static str] {
        &self.autocomplete_fields
    }

    pub fn prepopulated_fields(&self) -> &[(&'static str, Vec<&'static str>)] {
        &self.prepopulated_fields
    }

    pub fn actions(&self) -> &[&'static str] {
        &self.actions
    }

    pub fn inlines(&self) -> &[InlineAdmin] {
        &self.inlines
    }

    pub fn inline_for(&self, model: ModelKind) -> Option<&InlineAdmin> {
        self.inlines.iter().find(|inline| inline.model() == model)
    }

    pub fn is_editable(&self, column: &str) -> bool {
        self.list_editable.contains(&column)
    }

    /// Fills blank prepopulated targets in a submitted form from their
    /// source fields, slugified.
    pub fn prepopulate(&self, form: &mut BTreeMap<String, String>) {
        for (target, sources) in &self.prepopulated_fields {
            let blank = form
                .get(*target)
                .map_or(true, |value| value.trim().is_empty());
            if !blank {
                continue;
            }
            let joined = sources
                .iter()
                .filter_map(|source| form.get(*source).map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ");
            let slug = slugify(&joined);
            if !slug.is_empty() {
                form.insert((*target).to_string(), slug);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lookup, ModelAdmin, SearchField};
    use crate::model::ModelKind;
    use std::collections::BTreeMap;

    #[test]
    fn search_field_parses_known_lookup_suffixes() {
        assert_eq!(
            SearchField::parse("first_name__istartswith"),
            SearchField {
                field: "first_name".to_string(),
                lookup: Lookup::IStartsWith,
            }
        );
        assert_eq!(SearchField::parse("title").lookup, Lookup::IContains);
        assert_eq!(SearchField::parse("collection__title").field, "collection__title");
    }

    #[test]
    fn prepopulate_fills_only_blank_targets() {
        let admin = ModelAdmin::new(ModelKind::Product).with_prepopulated_field("slug", &["title"]);

        let mut blank = BTreeMap::from([
            ("title".to_string(), "Green Tea".to_string()),
            ("slug".to_string(), " ".to_string()),
        ]);
        admin.prepopulate(&mut blank);
        assert_eq!(blank["slug"], "green-tea");

        let mut explicit = BTreeMap::from([
            ("title".to_string(), "Green Tea".to_string()),
            ("slug".to_string(), "tea".to_string()),
        ]);
        admin.prepopulate(&mut explicit);
        assert_eq!(explicit["slug"], "tea");
    }
}
