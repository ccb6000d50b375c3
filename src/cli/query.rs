//! Search, filter and sort options shared by `list` and `export`.

use crate::db::query::{DateFilter, FieldFilter, RecordQuery};
use crate::types::Field;
use chrono::NaiveDate;
use clap::{Args, ValueEnum};

/// Named creation-date windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatePreset {
    All,
    Today,
    Week,
    Month,
}

#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Match text in name, title or notes
    #[arg(short, long)]
    pub search: Option<String>,

    /// Keep records whose field equals one of the values, e.g. `category=honor,account`
    ///
    /// Repeat for several fields; all filters must match.
    #[arg(short, long = "filter", value_name = "FIELD=VALUES", value_parser = parse_filter)]
    pub filters: Vec<FieldFilter>,

    /// Creation date window
    #[arg(long, value_enum, conflicts_with_all = ["from", "to"])]
    pub date: Option<DatePreset>,

    /// Created on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Created on or before this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Sort by this field (default: id)
    #[arg(long, value_name = "FIELD")]
    pub sort: Option<Field>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

impl QueryArgs {
    pub fn to_query(&self) -> RecordQuery {
        let date = match (self.date, self.from, self.to) {
            (_, from, to) if from.is_some() || to.is_some() => DateFilter::Range { from, to },
            (Some(DatePreset::Today), _, _) => DateFilter::Today,
            (Some(DatePreset::Week), _, _) => DateFilter::ThisWeek,
            (Some(DatePreset::Month), _, _) => DateFilter::ThisMonth,
            (Some(DatePreset::All) | None, _, _) => DateFilter::All,
        };

        let mut query = RecordQuery {
            search: self.search.clone(),
            filters: self.filters.clone(),
            date,
            sort: None,
        };
        if let Some(field) = self.sort {
            query = query.sort_by(field, !self.desc);
        } else if self.desc {
            query = query.sort_by(Field::Id, false);
        }
        query
    }
}

/// Parse `field=v1,v2` into a field filter.
fn parse_filter(s: &str) -> Result<FieldFilter, String> {
    let (field, values) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUES, got '{}'", s))?;
    let field: Field = field.parse()?;
    let values: Vec<String> = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    if values.is_empty() {
        return Err(format!("no values given for '{}'", field));
    }
    Ok(FieldFilter::new(field, values))
}
