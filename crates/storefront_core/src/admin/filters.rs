//! Change-list filters.
//!
//! A filter claims one or more query parameters, offers the choices shown in
//! the filter sidebar, and turns the selected value into a SQL predicate.

use super::{AdminError, AdminResult};
use crate::model::product::LOW_INVENTORY_THRESHOLD;
use crate::repo::collection_repo::{CollectionRepository, SqliteCollectionRepository};
use crate::repo::RepoResult;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::BTreeMap;

/// One selectable filter option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChoice {
    pub value: String,
    pub label: String,
}

impl FilterChoice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// SQL condition plus its bind values, joined into a change-list `WHERE`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlPredicate {
    pub sql: String,
    pub values: Vec<Value>,
}

/// Trait for change-list filters.
pub trait ListFilter {
    /// Heading shown above the choices.
    fn title(&self) -> &str;

    /// Query parameters this filter consumes.
    fn parameter_names(&self) -> &[&'static str];

    /// Options offered in the sidebar, excluding the implicit "All".
    fn choices(&self, conn: &Connection) -> RepoResult<Vec<FilterChoice>>;

    /// Predicate for the selected value, or `None` when unrestricted.
    fn predicate(&self, params: &BTreeMap<String, String>) -> AdminResult<Option<SqlPredicate>>;

    /// Currently selected value, if any of this filter's parameters is set.
    fn selected<'a>(&self, params: &'a BTreeMap<String, String>) -> Option<&'a str> {
        self.parameter_names()
            .iter()
            .find_map(|name| params.get(*name).map(String::as_str))
    }
}

/// Product inventory filter with a single `LOW` option (`inventory < 10`).
#[derive(Debug, Clone)]
pub struct InventoryFilter {
    column_sql: &'static str,
}

impl InventoryFilter {
    pub const PARAMETER: &'static str = "inventory";
    pub const LOW: &'static str = "<10";

    pub fn new(column_sql: &'static str) -> Self {
        Self { column_sql }
    }
}

impl ListFilter for InventoryFilter {
    fn title(&self) -> &str {
        "inventory"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &[Self::PARAMETER]
    }

    fn choices(&self, _conn: &Connection) -> RepoResult<Vec<FilterChoice>> {
        Ok(vec![FilterChoice::new(Self::LOW, "LOW")])
    }

    fn predicate(&self, params: &BTreeMap<String, String>) -> AdminResult<Option<SqlPredicate>> {
        match self.selected(params) {
            Some(Self::LOW) => Ok(Some(SqlPredicate {
                sql: format!("{} < ?", self.column_sql),
                values: vec![Value::Integer(i64::from(LOW_INVENTORY_THRESHOLD))],
            })),
            _ => Ok(None),
        }
    }
}

/// Foreign-key filter on a product's collection.
#[derive(Debug, Clone)]
pub struct CollectionFilter {
    column_sql: &'static str,
}

impl CollectionFilter {
    pub fn new(column_sql: &'static str) -> Self {
        Self { column_sql }
    }
}

impl ListFilter for CollectionFilter {
    fn title(&self) -> &str {
        "collection"
    }

    fn parameter_names(&self) -> &[&'static str] {
        &["collection__id__exact", "collection__id"]
    }

    fn choices(&self, conn: &Connection) -> RepoResult<Vec<FilterChoice>> {
        let collections = SqliteCollectionRepository::new(conn).list_collections()?;
        Ok(collections
            .into_iter()
            .map(|collection| FilterChoice::new(collection.id.to_string(), collection.title))
            .collect())
    }

    fn predicate(&self, params: &BTreeMap<String, String>) -> AdminResult<Option<SqlPredicate>> {
        let mut ids = Vec::new();
        for name in self.parameter_names() {
            if let Some(raw) = params.get(*name) {
                let id = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AdminError::InvalidLookup {
                        parameter: (*name).to_string(),
                        value: raw.clone(),
                    })?;
                ids.push(id);
            }
        }

        if ids.is_empty() {
            return Ok(None);
        }
        let sql = ids
            .iter()
            .map(|_| format!("{} = ?", self.column_sql))
            .collect::<Vec<_>>()
            .join(" AND ");
        Ok(Some(SqlPredicate {
            sql,
            values: ids.into_iter().map(Value::Integer).collect(),
        }))
    }
}

/// Date filter over an epoch-millisecond column, evaluated in UTC.
#[derive(Debug, Clone)]
pub struct DateFieldFilter {
    field: &'static str,
    column_sql: &'static str,
    now_ms: i64,
}

impl DateFieldFilter {
    pub const TODAY: &'static str = "today";
    pub const PAST_7_DAYS: &'static str = "past_7_days";
    pub const THIS_MONTH: &'static str = "this_month";
    pub const THIS_YEAR: &'static str = "this_year";

    pub fn new(field: &'static str, column_sql: &'static str, now_ms: i64) -> Self {
        Self {
            field,
            column_sql,
            now_ms,
        }
    }

    /// Half-open `[start, end)` millisecond range for a choice value.
    pub fn range(&self, value: &str) -> Option<(i64, i64)> {
        let today = DateTime::<Utc>::from_timestamp_millis(self.now_ms)?.date_naive();
        let tomorrow = today.succ_opt()?;
        let (start, end) = match value {
            Self::TODAY => (today, tomorrow),
            Self::PAST_7_DAYS => (today.checked_sub_signed(Duration::days(7))?, tomorrow),
            Self::THIS_MONTH => {
                let first = today.with_day(1)?;
                let next = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                (first, next)
            }
            Self::THIS_YEAR => (
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
            ),
            _ => return None,
        };
        Some((start_of_day_ms(start)?, start_of_day_ms(end)?))
    }
}

impl ListFilter for DateFieldFilter {
    fn title(&self) -> &str {
        self.field
    }

    fn parameter_names(&self) -> &[&'static str] {
        std::slice::from_ref(&self.field)
    }

    fn choices(&self, _conn: &Connection) -> RepoResult<Vec<FilterChoice>> {
        Ok(vec![
            FilterChoice::new(Self::TODAY, "Today"),
            FilterChoice::new(Self::PAST_7_DAYS, "Past 7 days"),
            FilterChoice::new(Self::THIS_MONTH, "This month"),
            FilterChoice::new(Self::THIS_YEAR, "This year"),
        ])
    }

    fn predicate(&self, params: &BTreeMap<String, String>) -> AdminResult<Option<SqlPredicate>> {
        let Some(value) = self.selected(params) else {
            return Ok(None);
        };
        let (start, end) = self.range(value).ok_or_else(|| AdminError::InvalidLookup {
            parameter: self.field.to_string(),
            value: value.to_string(),
        })?;
        Ok(Some(SqlPredicate {
            sql: format!("{col} >= ? AND {col} < ?", col = self.column_sql),
            values: vec![Value::Integer(start), Value::Integer(end)],
        }))
    }
}

fn start_of_day_ms(date: NaiveDate) -> Option<i64> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}
