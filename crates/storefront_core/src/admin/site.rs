//! Admin site registry.
//!
//! # Responsibility
//! - Own one [`ModelAdmin`] per registered model and the bulk actions
//!   those declarations reference.
//! - Route change-list, action, list-edit and autocomplete requests through
//!   the declaration of the model they target.
//! - Validate declarations against the schema (`check`).
//!
//! # Invariants
//! - A model is registered at most once.
//! - Actions only run when the model's declaration lists them and at least
//!   one row is selected.
//! - List edits of one submission commit together or not at all.

use super::actions::{ActionOutcome, AdminAction};
use super::changelist::{run_changelist, ChangeListPage, ChangeListParams, ChangeListSource, ListRow};
use super::options::{ModelAdmin, STR_COLUMN};
use super::store::{
    apply_list_edit, CollectionChangeList, CustomerChangeList, OrderChangeList, ProductChangeList,
};
use super::tags::TagChangeList;
use super::{store, tags, AdminError, AdminResult};
use crate::model::ModelKind;
use log::info;
use rusqlite::Connection;
use std::collections::BTreeMap;

/// One cell change submitted from a list-editable change list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEdit {
    pub pk: i64,
    pub column: String,
    pub value: String,
}

impl ListEdit {
    pub fn new(pk: i64, column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            pk,
            column: column.into(),
            value: value.into(),
        }
    }
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteItem {
    pub id: i64,
    pub text: String,
}

/// Problem found by [`AdminSite::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    pub model: ModelKind,
    pub message: String,
}

impl std::fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.model, self.message)
    }
}

/// Registry of admin declarations.
#[derive(Default)]
pub struct AdminSite {
    registry: BTreeMap<ModelKind, ModelAdmin>,
    actions: BTreeMap<(ModelKind, &'static str), Box<dyn AdminAction>>,
}

impl AdminSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Site with every store and tag admin registered.
    pub fn with_default_admins() -> AdminResult<Self> {
        let mut site = Self::new();
        store::register(&mut site)?;
        tags::register(&mut site)?;
        Ok(site)
    }

    pub fn register(&mut self, admin: ModelAdmin) -> AdminResult<()> {
        let model = admin.model();
        if self.registry.contains_key(&model) {
            return Err(AdminError::AlreadyRegistered(model));
        }
        self.registry.insert(model, admin);
        Ok(())
    }

    pub fn register_action(&mut self, action: Box<dyn AdminAction>) {
        self.actions.insert((action.model(), action.name()), action);
    }

    pub fn is_registered(&self, model: ModelKind) -> bool {
        self.registry.contains_key(&model)
    }

    pub fn registered_models(&self) -> Vec<ModelKind> {
        self.registry.keys().copied().collect()
    }

    pub fn get(&self, model: ModelKind) -> Option<&ModelAdmin> {
        self.registry.get(&model)
    }

    pub fn model_admin(&self, model: ModelKind) -> AdminResult<&ModelAdmin> {
        self.get(model).ok_or(AdminError::NotRegistered(model))
    }

    /// `(name, description)` of every action offered on a model's change list.
    pub fn action_choices(&self, model: ModelKind) -> AdminResult<Vec<(&'static str, &'static str)>> {
        let admin = self.model_admin(model)?;
        Ok(admin
            .actions()
            .iter()
            .filter_map(|name| self.actions.get(&(model, *name)))
            .map(|action| (action.name(), action.description()))
            .collect())
    }

    /// Runs a change list with the declaration registered for `source`'s model.
    pub fn changelist<S: ChangeListSource>(
        &self,
        conn: &Connection,
        source: &S,
        params: &ChangeListParams,
    ) -> AdminResult<ChangeListPage<S::Row>> {
        let admin = self.model_admin(source.model())?;
        run_changelist(conn, admin, source, params)
    }

    /// Applies a bulk action to the selected rows.
    pub fn run_action(
        &self,
        conn: &Connection,
        model: ModelKind,
        action_name: &str,
        ids: &[i64],
    ) -> AdminResult<ActionOutcome> {
        let admin = self.model_admin(model)?;
        let unknown = || AdminError::UnknownAction {
            model,
            action: action_name.to_string(),
        };
        let name = admin
            .actions()
            .iter()
            .copied()
            .find(|name| *name == action_name)
            .ok_or_else(unknown)?;
        let action = self.actions.get(&(model, name)).ok_or_else(unknown)?;
        if ids.is_empty() {
            return Err(AdminError::EmptySelection);
        }

        let outcome = action.execute(conn, ids)?;
        info!(
            "event=admin_action module=admin status=ok model={} action={} selected={} affected={}",
            model,
            name,
            ids.len(),
            outcome.affected
        );
        Ok(outcome)
    }

    /// Saves list-editable cell changes in one transaction.
    ///
    /// Returns the number of edits applied.
    pub fn save_list_edits(
        &self,
        conn: &mut Connection,
        model: ModelKind,
        edits: &[ListEdit],
    ) -> AdminResult<usize> {
        let admin = self.model_admin(model)?;
        if let Some(edit) = edits.iter().find(|edit| !admin.is_editable(&edit.column)) {
            return Err(AdminError::NotEditable {
                model,
                column: edit.column.clone(),
            });
        }

        let tx = conn.transaction()?;
        for edit in edits {
            apply_list_edit(&tx, model, edit)?;
        }
        tx.commit()?;

        info!(
            "event=admin_list_edit module=admin status=ok model={} edits={}",
            model,
            edits.len()
        );
        Ok(edits.len())
    }

    /// Suggestions for an autocomplete foreign-key field of `model`.
    ///
    /// `model` is either a registered model or the model of an inline on
    /// one. Matching uses the target admin's search fields and ordering.
    pub fn autocomplete(
        &self,
        conn: &Connection,
        model: ModelKind,
        field: &str,
        term: &str,
        now_ms: i64,
    ) -> AdminResult<Vec<AutocompleteItem>> {
        let not_autocomplete = || AdminError::NotAutocomplete {
            model,
            field: field.to_string(),
        };
        if !self.declares_autocomplete(model, field) {
            return Err(not_autocomplete());
        }
        let target = model.foreign_key_target(field).ok_or_else(not_autocomplete)?;
        let target_admin = self.model_admin(target)?;
        if target_admin.search_fields().is_empty() {
            return Err(not_autocomplete());
        }

        let params = ChangeListParams::new(now_ms).with_search(term);
        match target {
            ModelKind::Collection => suggestions(conn, target_admin, &CollectionChangeList, &params),
            ModelKind::Product => suggestions(conn, target_admin, &ProductChangeList, &params),
            ModelKind::Customer => suggestions(conn, target_admin, &CustomerChangeList, &params),
            ModelKind::Order => suggestions(conn, target_admin, &OrderChangeList, &params),
            ModelKind::Tag => suggestions(conn, target_admin, &TagChangeList, &params),
            ModelKind::OrderItem => Err(not_autocomplete()),
        }
    }

    fn declares_autocomplete(&self, model: ModelKind, field: &str) -> bool {
        let direct = self
            .get(model)
            .is_some_and(|admin| admin.autocomplete_fields().contains(&field));
        direct
            || self.registry.values().any(|admin| {
                admin
                    .inline_for(model)
                    .is_some_and(|inline| inline.autocomplete_fields().contains(&field))
            })
    }

    /// Validates every registered declaration against the schema.
    pub fn check(&self) -> Vec<CheckMessage> {
        let mut messages = Vec::new();
        for admin in self.registry.values() {
            self.check_admin(admin, &mut messages);
        }
        messages
    }

    fn check_admin(&self, admin: &ModelAdmin, messages: &mut Vec<CheckMessage>) {
        let model = admin.model();
        let mut report = |message: String| messages.push(CheckMessage { model, message });

        for column in admin.list_display() {
            if !is_display_column(model, column) {
                report(format!("list_display refers to unknown column `{column}`"));
            }
        }
        for (index, column) in admin.list_editable().iter().enumerate() {
            let position = admin.list_display().iter().position(|shown| shown == column);
            match position {
                None => report(format!("list_editable column `{column}` is not in list_display")),
                Some(0) => report(format!(
                    "list_editable column `{column}` is the first list_display column and links to the change form"
                )),
                Some(_) if !model.has_field(column) => {
                    report(format!("list_editable[{index}] `{column}` is not a model field"))
                }
                Some(_) => {}
            }
        }
        for field in admin.search_fields() {
            if !model.has_field(&field.field) {
                report(format!("search_fields refers to unknown field `{}`", field.field));
            }
        }
        for raw in admin.ordering() {
            let field = raw.trim_start_matches('-');
            if !model.has_field(field) {
                report(format!("ordering refers to unknown field `{field}`"));
            }
        }
        for relation in admin.list_select_related() {
            if model.foreign_key_target(relation).is_none() {
                report(format!("list_select_related `{relation}` is not a foreign key"));
            }
        }
        for name in admin.list_filter() {
            if !model.has_field(name) {
                report(format!("list_filter refers to unknown field `{name}`"));
            }
        }
        for (target, sources) in admin.prepopulated_fields() {
            for field in std::iter::once(target).chain(sources.iter()) {
                if !model.has_field(field) {
                    report(format!("prepopulated_fields refers to unknown field `{field}`"));
                }
            }
        }
        for name in admin.actions() {
            if !self.actions.contains_key(&(model, *name)) {
                report(format!("action `{name}` is not registered"));
            }
        }
        for field in admin.autocomplete_fields() {
            if let Some(message) = self.check_autocomplete(model, field) {
                report(message);
            }
        }
        for inline in admin.inlines() {
            if inline.model().foreign_key_target(inline.fk_name()) != Some(model) {
                report(format!(
                    "inline {} has no foreign key `{}` to {model}",
                    inline.model(),
                    inline.fk_name()
                ));
            }
            if inline.max_num().is_some_and(|max| max < inline.min_num()) {
                report(format!("inline {} has max_num below min_num", inline.model()));
            }
            for field in inline.autocomplete_fields() {
                if let Some(message) = self.check_autocomplete(inline.model(), field) {
                    report(format!("inline {}: {message}", inline.model()));
                }
            }
        }
    }

    fn check_autocomplete(&self, model: ModelKind, field: &str) -> Option<String> {
        let Some(target) = model.foreign_key_target(field) else {
            return Some(format!("autocomplete field `{field}` is not a foreign key"));
        };
        match self.get(target) {
            None => Some(format!(
                "autocomplete field `{field}` targets {target}, which is not registered"
            )),
            Some(admin) if admin.search_fields().is_empty() => Some(format!(
                "autocomplete field `{field}` targets {target}, whose admin defines no search_fields"
            )),
            Some(_) => None,
        }
    }
}

fn suggestions<S: ChangeListSource>(
    conn: &Connection,
    admin: &ModelAdmin,
    source: &S,
    params: &ChangeListParams,
) -> AdminResult<Vec<AutocompleteItem>> {
    let page = run_changelist(conn, admin, source, params)?;
    Ok(page
        .rows
        .iter()
        .map(|row| AutocompleteItem {
            id: row.pk(),
            text: row.label(),
        })
        .collect())
}

/// Display columns computed from joins or annotations rather than fields.
fn computed_columns(model: ModelKind) -> &'static [&'static str] {
    match model {
        ModelKind::Product => &["inventory_status", "collection_title"],
        ModelKind::Collection => &["products_count"],
        ModelKind::Tag => &["tagged_count"],
        _ => &[],
    }
}

fn is_display_column(model: ModelKind, column: &str) -> bool {
    column == STR_COLUMN || model.has_field(column) || computed_columns(model).contains(&column)
}
