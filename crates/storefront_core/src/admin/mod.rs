//! Administrative interface: per-model declarations and the machinery that
//! executes them.
//!
//! # Responsibility
//! - Hold one [`ModelAdmin`] declaration per registered model.
//! - Run change lists (search, filters, ordering, pagination) from
//!   Django-style query strings.
//! - Execute bulk actions, list-editable saves and inline formset checks.
//!
//! # Invariants
//! - Every behavior is driven by a declaration registered on [`AdminSite`];
//!   nothing is reachable for an unregistered model.
//! - Unknown filter parameters and unsortable columns are rejected, never
//!   silently ignored.

use crate::model::ModelKind;
use crate::repo::RepoError;
use thiserror::Error;

pub mod actions;
pub mod changelist;
pub mod display;
pub mod filters;
pub mod inline;
pub mod options;
pub mod site;
pub mod store;
pub mod tags;

pub use actions::{ActionOutcome, AdminAction, AdminMessage, ClearInventoryAction, MessageLevel};
pub use changelist::{
    run_changelist, ChangeListPage, ChangeListParams, ChangeListSource, FilterPanel, ListRow,
    OrderTerm,
};
pub use display::{inventory_status, Cell};
pub use filters::{FilterChoice, ListFilter};
pub use inline::{InlineAdmin, InlineFormsetError};
pub use options::{Lookup, ModelAdmin, SearchField};
pub use site::{AdminSite, AutocompleteItem, CheckMessage, ListEdit};

pub type AdminResult<T> = Result<T, AdminError>;

/// Error raised by admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("model {0} is not registered with the admin site")]
    NotRegistered(ModelKind),
    #[error("model {0} is already registered with the admin site")]
    AlreadyRegistered(ModelKind),
    #[error("incorrect lookup parameter `{parameter}={value}`")]
    InvalidLookup { parameter: String, value: String },
    #[error("{model} declares unknown list filter `{filter}`")]
    UnknownFilter { model: ModelKind, filter: String },
    #[error("cannot order {model} change list by `{column}`")]
    InvalidOrdering { model: ModelKind, column: String },
    #[error("invalid page {page}; change list has {num_pages} page(s)")]
    InvalidPage { page: u32, num_pages: u32 },
    #[error("action `{action}` is not available for {model}")]
    UnknownAction { model: ModelKind, action: String },
    #[error("items must be selected in order to perform actions on them")]
    EmptySelection,
    #[error("column `{column}` of {model} is not list-editable")]
    NotEditable { model: ModelKind, column: String },
    #[error("invalid value `{value}` for column `{column}`")]
    InvalidValue { column: String, value: String },
    #[error("{model}.{field} does not support autocomplete")]
    NotAutocomplete { model: ModelKind, field: String },
    #[error(transparent)]
    Formset(#[from] InlineFormsetError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<rusqlite::Error> for AdminError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}
