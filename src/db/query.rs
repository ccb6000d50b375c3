//! Filtered, searched and sorted record queries.
//!
//! Every value supplied by the user is bound as a parameter. The only text
//! interpolated into SQL comes from [`Field::column`] and fixed fragments.

use super::{Database, RECORD_COLUMNS, parse_record_row};
use crate::error::RecordError;
use crate::types::{Category, Field, Record};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::ToSql;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Columns matched by the free-text search.
pub const SEARCH_FIELDS: [Field; 3] = [Field::Name, Field::Title, Field::Notes];

/// Restrict results by creation date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
    /// Inclusive date range; either bound may be open.
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DateFilter {
    /// Parse the named presets: `all`, `today`, `week`, `month`.
    pub fn parse_preset(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Some(DateFilter::All),
            "today" => Some(DateFilter::Today),
            "week" | "this_week" => Some(DateFilter::ThisWeek),
            "month" | "this_month" => Some(DateFilter::ThisMonth),
            _ => None,
        }
    }
}

/// Allowed values for one field. One value matches with `=`, several with `IN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: Field,
    pub values: Vec<String>,
}

impl FieldFilter {
    pub fn new(field: Field, values: Vec<String>) -> Self {
        Self { field, values }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: Field,
    pub ascending: bool,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: Field::Id,
            ascending: true,
        }
    }
}

/// Query parameters for the records view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    pub search: Option<String>,
    pub filters: Vec<FieldFilter>,
    pub date: DateFilter,
    pub sort: Option<Sort>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, field: Field, values: Vec<String>) -> Self {
        self.filters.push(FieldFilter::new(field, values));
        self
    }

    pub fn date(mut self, date: DateFilter) -> Self {
        self.date = date;
        self
    }

    pub fn sort_by(mut self, field: Field, ascending: bool) -> Self {
        self.sort = Some(Sort { field, ascending });
        self
    }

    /// True when the query narrows the result set (sorting does not count).
    pub fn is_filtered(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.filters.iter().any(|f| !f.values.is_empty())
            || self.date != DateFilter::All
    }

    /// Build a query from URL-encoded key/value pairs, as sent by the
    /// dashboard's filter form.
    ///
    /// Recognised keys: `search`, `date` (`all|today|week|month|custom`),
    /// `from`, `to`, `sort`, `order` (`asc|desc`), and any field name
    /// (repeated for several allowed values). Empty values are ignored.
    /// Field values are matched as given, surrounding spaces included, so a
    /// value picked from [`Database::distinct_values`] always matches.
    ///
    /// `from`/`to` only imply a range when no `date` mode is sent; an
    /// explicit `date=all` ignores them.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, RecordError> {
        let mut query = RecordQuery::new();
        let mut date_mode: Option<String> = None;
        let mut from = None;
        let mut to = None;
        let mut sort_field = None;
        let mut ascending = true;

        for (key, raw) in pairs {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "search" => query.search = Some(value.to_string()),
                "date" => date_mode = Some(value.to_lowercase()),
                "from" => from = Some(parse_date("from", value)?),
                "to" => to = Some(parse_date("to", value)?),
                "sort" => {
                    sort_field = Some(Field::parse(value).ok_or_else(|| {
                        RecordError::invalid_value("sort", format!("Unknown field '{}'", value))
                    })?)
                }
                "order" => ascending = !value.eq_ignore_ascii_case("desc"),
                other => {
                    // Unknown keys (htmx metadata and the like) are ignored.
                    if let Some(field) = Field::parse(other) {
                        match query.filters.iter_mut().find(|f| f.field == field) {
                            Some(existing) => existing.values.push(raw.clone()),
                            None => query.filters.push(FieldFilter::new(field, vec![raw.clone()])),
                        }
                    }
                }
            }
        }

        query.date = match date_mode.as_deref() {
            None if from.is_some() || to.is_some() => DateFilter::Range { from, to },
            None => DateFilter::All,
            Some("custom" | "range") => DateFilter::Range { from, to },
            Some(mode) => match DateFilter::parse_preset(mode) {
                Some(preset) => preset,
                None => {
                    return Err(RecordError::invalid_value(
                        "date",
                        format!("Unknown date filter '{}'", mode),
                    ));
                }
            },
        };
        query.sort = sort_field.map(|field| Sort { field, ascending });

        Ok(query)
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        RecordError::invalid_value(field, format!("Invalid date '{}': expected YYYY-MM-DD", value))
    })
}

/// Escape `LIKE` wildcards so the term matches literally (`ESCAPE '\'`).
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// A `WHERE` clause with its bound parameters.
#[derive(Default)]
pub(crate) struct WhereClause {
    pub conditions: Vec<String>,
    pub params: Vec<Box<dyn ToSql>>,
}

impl WhereClause {
    /// Render as ` WHERE a AND b`, or an empty string with no conditions.
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// Translate a query into SQL conditions and parameters.
pub(crate) fn build_where(query: &RecordQuery) -> Result<WhereClause, RecordError> {
    let mut clause = WhereClause::default();

    // Free-text search across name, title and notes
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", escape_like(term));
        let ors: Vec<String> = SEARCH_FIELDS
            .iter()
            .map(|f| format!("{} LIKE ? ESCAPE '\\'", f.column()))
            .collect();
        clause.conditions.push(format!("({})", ors.join(" OR ")));
        for _ in SEARCH_FIELDS {
            clause.params.push(Box::new(pattern.clone()));
        }
    }

    // Field filters
    for filter in &query.filters {
        let values: Vec<&str> = filter
            .values
            .iter()
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
            .collect();
        if values.is_empty() {
            continue;
        }

        let column = filter.field.column();
        if values.len() == 1 {
            clause.conditions.push(format!("{} = ?", column));
        } else {
            let placeholders = vec!["?"; values.len()].join(", ");
            clause.conditions.push(format!("{} IN ({})", column, placeholders));
        }

        for value in values {
            clause.params.push(filter_param(filter.field, value)?);
        }
    }

    // Creation date
    match query.date {
        DateFilter::All => {}
        DateFilter::Today => clause
            .conditions
            .push("date(created_at) = date('now')".to_string()),
        DateFilter::ThisWeek => clause
            .conditions
            .push("strftime('%Y-%W', created_at) = strftime('%Y-%W', 'now')".to_string()),
        DateFilter::ThisMonth => clause
            .conditions
            .push("strftime('%Y-%m', created_at) = strftime('%Y-%m', 'now')".to_string()),
        DateFilter::Range { from, to } => {
            if let Some(from) = from {
                clause.conditions.push("date(created_at) >= ?".to_string());
                clause.params.push(Box::new(from.format("%Y-%m-%d").to_string()));
            }
            if let Some(to) = to {
                clause.conditions.push("date(created_at) <= ?".to_string());
                clause.params.push(Box::new(to.format("%Y-%m-%d").to_string()));
            }
        }
    }

    Ok(clause)
}

/// Convert a filter value to a typed parameter for its column.
fn filter_param(field: Field, value: &str) -> Result<Box<dyn ToSql>, RecordError> {
    match field {
        Field::Id => value
            .trim()
            .parse::<i64>()
            .map(|id| Box::new(id) as Box<dyn ToSql>)
            .map_err(|_| RecordError::invalid_value("id", format!("Invalid record id '{}'", value))),
        // Accept labels as well as storage ids
        Field::Category => Ok(Box::new(
            Category::parse(value)
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| value.to_string()),
        )),
        _ => Ok(Box::new(value.to_string())),
    }
}

fn order_clause(sort: Option<Sort>) -> String {
    let sort = sort.unwrap_or_default();
    let direction = if sort.ascending { "ASC" } else { "DESC" };
    if sort.field == Field::Id {
        format!(" ORDER BY id {}", direction)
    } else {
        format!(" ORDER BY {} {}, id ASC", sort.field.column(), direction)
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    }
}

impl Database {
    /// Query records with search, field filters, date filter and sort.
    pub fn query_records(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        let clause = build_where(query)?;

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM records{}{}",
                RECORD_COLUMNS,
                clause.sql(),
                order_clause(query.sort)
            );
            debug!(sql = %sql, params = clause.params.len(), "Querying records");

            let params_refs: Vec<&dyn ToSql> = clause.params.iter().map(|b| b.as_ref()).collect();
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map(params_refs.as_slice(), parse_record_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }

    /// Distinct values of a field, for building filter selects.
    pub fn distinct_values(&self, field: Field) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT DISTINCT {col} FROM records ORDER BY {col}",
                col = field.column()
            );
            let mut stmt = conn.prepare(&sql)?;
            let values = stmt
                .query_map([], |row| row.get::<_, Value>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?
                .into_iter()
                .map(value_to_string)
                .collect();
            Ok(values)
        })
    }
}
