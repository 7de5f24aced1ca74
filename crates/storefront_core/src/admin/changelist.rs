//! Change-list engine: search, filters, ordering and pagination over one
//! model, driven by its [`ModelAdmin`] declaration.
//!
//! # Invariants
//! - Every filter parameter must be claimed by a declared filter.
//! - Ordering always ends with the primary key so pages are stable.
//! - Search terms are AND-ed; each term matches if any search field does.
//! - Pages are 1-based; page 1 of an empty list is valid.

use super::display::Cell;
use super::filters::{FilterChoice, ListFilter, SqlPredicate};
use super::options::{Lookup, ModelAdmin, STR_COLUMN};
use super::{AdminError, AdminResult};
use crate::model::ModelKind;
use crate::repo::RepoResult;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::BTreeMap;
use url::form_urlencoded;

pub const SEARCH_VAR: &str = "q";
pub const ORDER_VAR: &str = "o";
pub const PAGE_VAR: &str = "p";

/// One ordering column; `-column` sorts descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub descending: bool,
}

impl OrderTerm {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (column, descending) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        if column.is_empty() {
            return None;
        }
        Some(Self {
            column: column.to_string(),
            descending,
        })
    }

    fn sql(&self, expr: &str) -> String {
        format!("{expr} {}", if self.descending { "DESC" } else { "ASC" })
    }
}

/// Request parameters for one change-list page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeListParams {
    pub search: Option<String>,
    pub ordering: Vec<OrderTerm>,
    /// 1-based page number.
    pub page: u32,
    /// Filter parameters, keyed by query parameter name.
    pub filters: BTreeMap<String, String>,
    /// Reference time for relative date filters, epoch milliseconds.
    pub now_ms: i64,
}

impl ChangeListParams {
    pub fn new(now_ms: i64) -> Self {
        Self {
            page: 1,
            now_ms,
            ..Self::default()
        }
    }

    /// Parses a URL query string such as `q=tea&o=-inventory_status&inventory=%3C10`.
    pub fn from_query_string(query: &str, now_ms: i64) -> AdminResult<Self> {
        let mut params = Self::new(now_ms);
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                SEARCH_VAR => params.search = Some(value.into_owned()),
                ORDER_VAR => {
                    params.ordering = value.split(',').filter_map(OrderTerm::parse).collect();
                }
                PAGE_VAR => {
                    params.page = value.trim().parse().map_err(|_| AdminError::InvalidLookup {
                        parameter: PAGE_VAR.to_string(),
                        value: value.to_string(),
                    })?;
                }
                _ => {
                    params
                        .filters
                        .insert(key.into_owned(), value.into_owned());
                }
            }
        }
        Ok(params)
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_filter(mut self, parameter: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(parameter.into(), value.into());
        self
    }

    pub fn with_ordering(mut self, raw: &str) -> Self {
        self.ordering = raw.split(',').filter_map(OrderTerm::parse).collect();
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    fn search_terms(&self) -> Vec<&str> {
        self.search
            .as_deref()
            .map(|text| text.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A row type that can be shown in a change list.
pub trait ListRow {
    fn pk(&self) -> i64;
    /// Human-readable name, used for `__str__` cells and autocomplete.
    fn label(&self) -> String;
    /// Cell for a display column other than `__str__`.
    fn cell(&self, column: &str) -> Option<Cell>;
}

/// SQL backing of one model's change list.
pub trait ChangeListSource {
    type Row: ListRow;

    fn model(&self) -> ModelKind;

    /// `SELECT ... FROM ...` including joins and annotations, without `WHERE`.
    fn select_sql(&self) -> &'static str;

    fn group_by_sql(&self) -> Option<&'static str> {
        None
    }

    /// SQL expression of a model field (search, default ordering, pk).
    fn column_sql(&self, field: &str) -> Option<&'static str>;

    /// Sort expression of a display column; `None` when not sortable.
    fn sort_sql(&self, column: &str) -> Option<&'static str> {
        self.column_sql(column)
    }

    /// Builds the filter declared under `name` in `list_filter`.
    fn filter(&self, name: &str, params: &ChangeListParams) -> Option<Box<dyn ListFilter>>;

    fn parse_row(&self, row: &Row<'_>) -> RepoResult<Self::Row>;
}

/// Sidebar state of one filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPanel {
    pub title: String,
    pub choices: Vec<FilterChoice>,
    pub selected: Option<String>,
}

/// One rendered change-list page.
#[derive(Debug, Clone)]
pub struct ChangeListPage<R> {
    pub model: ModelKind,
    pub columns: Vec<&'static str>,
    pub rows: Vec<R>,
    pub filters: Vec<FilterPanel>,
    pub total_count: usize,
    pub page: u32,
    pub num_pages: u32,
    pub per_page: u32,
}

impl<R: ListRow> ChangeListPage<R> {
    pub fn pks(&self) -> Vec<i64> {
        self.rows.iter().map(ListRow::pk).collect()
    }

    /// Cells per row in `list_display` order. Unknown columns render empty.
    pub fn cells(&self) -> Vec<Vec<Cell>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|column| {
                        if *column == STR_COLUMN {
                            Cell::Text(row.label())
                        } else {
                            row.cell(column).unwrap_or_else(|| Cell::text(""))
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Runs one change-list request.
pub fn run_changelist<S: ChangeListSource>(
    conn: &Connection,
    admin: &ModelAdmin,
    source: &S,
    params: &ChangeListParams,
) -> AdminResult<ChangeListPage<S::Row>> {
    let model = source.model();
    let mut clauses: Vec<String> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(predicate) = search_predicate(admin, source, params) {
        clauses.push(predicate.sql);
        bind_values.extend(predicate.values);
    }

    let filters = build_filters(admin, source, params)?;
    reject_unclaimed_parameters(&filters, params)?;
    let mut panels = Vec::with_capacity(filters.len());
    for filter in &filters {
        if let Some(predicate) = filter.predicate(&params.filters)? {
            clauses.push(format!("({})", predicate.sql));
            bind_values.extend(predicate.values);
        }
        panels.push(FilterPanel {
            title: filter.title().to_string(),
            choices: filter.choices(conn)?,
            selected: filter.selected(&params.filters).map(str::to_string),
        });
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    let group_sql = source
        .group_by_sql()
        .map(|group| format!(" GROUP BY {group}"))
        .unwrap_or_default();
    let order_sql = ordering_sql(admin, source, params)?;

    let total_count: i64 = conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM ({}{where_sql}{group_sql}) AS counted;",
            source.select_sql()
        ),
        params_from_iter(bind_values.iter()),
        |row| row.get(0),
    )?;
    let total_count = usize::try_from(total_count).unwrap_or(0);

    let per_page = admin.list_per_page();
    let num_pages = u32::try_from(total_count.div_ceil(per_page as usize))
        .unwrap_or(u32::MAX)
        .max(1);
    if params.page == 0 || params.page > num_pages {
        return Err(AdminError::InvalidPage {
            page: params.page,
            num_pages,
        });
    }

    let sql = format!(
        "{}{where_sql}{group_sql} ORDER BY {order_sql} LIMIT ? OFFSET ?;",
        source.select_sql()
    );
    bind_values.push(Value::Integer(i64::from(per_page)));
    bind_values.push(Value::Integer(
        i64::from(params.page - 1) * i64::from(per_page),
    ));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut parsed = Vec::new();
    while let Some(row) = rows.next()? {
        parsed.push(source.parse_row(row)?);
    }

    debug!(
        "event=changelist module=admin status=ok model={} total={} page={} rows={}",
        model,
        total_count,
        params.page,
        parsed.len()
    );

    Ok(ChangeListPage {
        model,
        columns: admin.list_display().to_vec(),
        rows: parsed,
        filters: panels,
        total_count,
        page: params.page,
        num_pages,
        per_page,
    })
}

fn search_predicate<S: ChangeListSource>(
    admin: &ModelAdmin,
    source: &S,
    params: &ChangeListParams,
) -> Option<SqlPredicate> {
    let terms = params.search_terms();
    // Fields without a SQL column are reported by `AdminSite::check`.
    let fields: Vec<(&'static str, Lookup)> = admin
        .search_fields()
        .iter()
        .filter_map(|field| source.column_sql(&field.field).map(|sql| (sql, field.lookup)))
        .collect();
    if terms.is_empty() || fields.is_empty() {
        return None;
    }

    let mut groups = Vec::with_capacity(terms.len());
    let mut values = Vec::new();
    for term in terms {
        let alternatives = fields
            .iter()
            .map(|(column, lookup)| {
                let (sql, value) = lookup_sql(column, *lookup, term);
                values.push(Value::Text(value));
                sql
            })
            .collect::<Vec<_>>();
        groups.push(format!("({})", alternatives.join(" OR ")));
    }

    Some(SqlPredicate {
        sql: groups.join(" AND "),
        values,
    })
}

fn lookup_sql(column: &str, lookup: Lookup, term: &str) -> (String, String) {
    match lookup {
        Lookup::IContains => (
            format!("{column} LIKE ? ESCAPE '\\'"),
            format!("%{}%", escape_like(term)),
        ),
        Lookup::IStartsWith => (
            format!("{column} LIKE ? ESCAPE '\\'"),
            format!("{}%", escape_like(term)),
        ),
        Lookup::IExact => (format!("{column} = ? COLLATE NOCASE"), term.to_string()),
        Lookup::Exact => (format!("{column} = ?"), term.to_string()),
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn build_filters<S: ChangeListSource>(
    admin: &ModelAdmin,
    source: &S,
    params: &ChangeListParams,
) -> AdminResult<Vec<Box<dyn ListFilter>>> {
    admin
        .list_filter()
        .iter()
        .map(|name| {
            source
                .filter(name, params)
                .ok_or_else(|| AdminError::UnknownFilter {
                    model: source.model(),
                    filter: (*name).to_string(),
                })
        })
        .collect()
}

fn reject_unclaimed_parameters(
    filters: &[Box<dyn ListFilter>],
    params: &ChangeListParams,
) -> AdminResult<()> {
    for (parameter, value) in &params.filters {
        let claimed = filters
            .iter()
            .any(|filter| filter.parameter_names().contains(&parameter.as_str()));
        if !claimed {
            return Err(AdminError::InvalidLookup {
                parameter: parameter.clone(),
                value: value.clone(),
            });
        }
    }
    Ok(())
}

fn ordering_sql<S: ChangeListSource>(
    admin: &ModelAdmin,
    source: &S,
    params: &ChangeListParams,
) -> AdminResult<String> {
    let pk_sql = source.column_sql("id").unwrap_or("id");
    let mut parts = Vec::new();
    let mut has_pk = false;

    if params.ordering.is_empty() {
        for raw in admin.ordering() {
            let Some(term) = OrderTerm::parse(raw) else {
                continue;
            };
            let expr = source
                .column_sql(&term.column)
                .ok_or_else(|| invalid_ordering(source.model(), &term.column))?;
            has_pk |= expr == pk_sql;
            parts.push(term.sql(expr));
        }
    } else {
        for term in &params.ordering {
            if !admin.list_display().contains(&term.column.as_str()) {
                return Err(invalid_ordering(source.model(), &term.column));
            }
            let expr = source
                .sort_sql(&term.column)
                .ok_or_else(|| invalid_ordering(source.model(), &term.column))?;
            has_pk |= expr == pk_sql;
            parts.push(term.sql(expr));
        }
    }

    if !has_pk {
        parts.push(format!("{pk_sql} DESC"));
    }
    Ok(parts.join(", "))
}

fn invalid_ordering(model: ModelKind, column: &str) -> AdminError {
    AdminError::InvalidOrdering {
        model,
        column: column.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{escape_like, ChangeListParams, OrderTerm};

    #[test]
    fn query_string_splits_reserved_and_filter_parameters() {
        let params =
            ChangeListParams::from_query_string("?q=green+tea&o=-inventory_status,title&p=2&inventory=%3C10", 0)
                .unwrap();
        assert_eq!(params.search.as_deref(), Some("green tea"));
        assert_eq!(
            params.ordering,
            vec![
                OrderTerm {
                    column: "inventory_status".to_string(),
                    descending: true
                },
                OrderTerm {
                    column: "title".to_string(),
                    descending: false
                },
            ]
        );
        assert_eq!(params.page, 2);
        assert_eq!(params.filters.get("inventory").map(String::as_str), Some("<10"));
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        assert!(ChangeListParams::from_query_string("p=last", 0).is_err());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
