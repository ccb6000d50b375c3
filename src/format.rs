//! Plain-text, JSON and CSV rendering for the command line.

use crate::chart::render_text_bar_chart;
use crate::csv_io::{CsvPreview, records_to_csv};
use crate::types::{Field, Record, RecordStats};
use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Width of the longest bar in the text chart.
const CHART_WIDTH: usize = 40;

/// Longest cell shown in a table before truncation.
const MAX_CELL: usize = 40;

/// Output format for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Render records in the chosen format.
pub fn format_records(records: &[Record], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_records_table(records)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => Ok(String::from_utf8(records_to_csv(records)?)?),
    }
}

/// Single-line cell text, cut to [`MAX_CELL`] characters.
fn cell(value: &str) -> String {
    let flat = value.replace(['\r', '\n'], " ");
    if flat.chars().count() > MAX_CELL {
        let cut: String = flat.chars().take(MAX_CELL - 1).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

/// Align rows under a header, separated by a rule.
fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, value) in widths.iter_mut().zip(row) {
            *w = (*w).max(value.chars().count());
        }
    }

    let render = |values: &[String]| -> String {
        let cols: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", v, w = *w))
            .collect();
        format!("{}\n", cols.join("  ").trim_end())
    };

    let mut out = render(headers);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&render(&rule));
    for row in rows {
        out.push_str(&render(row));
    }
    out
}

/// Format records as an aligned table.
pub fn format_records_table(records: &[Record]) -> String {
    if records.is_empty() {
        return "No records.\n".to_string();
    }

    let headers: Vec<String> = Field::ALL.iter().map(|f| f.column().to_string()).collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| Field::ALL.iter().map(|f| cell(&r.field_value(*f))).collect())
        .collect();

    let mut out = format_table(&headers, &rows);
    out.push_str(&format!("\n{} record(s)\n", records.len()));
    out
}

/// Format the first rows of a CSV file before import.
pub fn format_csv_preview(preview: &CsvPreview) -> String {
    let headers: Vec<String> = preview.headers.iter().map(|h| cell(h)).collect();
    let rows: Vec<Vec<String>> = preview
        .rows
        .iter()
        .map(|row| row.iter().map(|v| cell(v)).collect())
        .collect();

    let mut out = format_table(&headers, &rows);
    out.push_str(&format!(
        "\nShowing {} of {} row(s)\n",
        preview.rows.len(),
        preview.total_rows
    ));
    out
}

/// Format one record as labelled lines.
pub fn format_record_detail(record: &Record) -> String {
    let mut out = String::new();
    out.push_str(&format!("Record #{}\n", record.id));
    out.push_str(&format!("  Title:    {}\n", record.title));
    if !record.name.is_empty() {
        out.push_str(&format!("  Name:     {}\n", record.name));
    }
    out.push_str(&format!(
        "  Category: {} ({})\n",
        record.category.label(),
        record.category.native_label()
    ));
    out.push_str(&format!("  Created:  {}\n", record.created_at));
    if !record.notes.is_empty() {
        out.push_str("  Notes:\n");
        for line in record.notes.lines() {
            out.push_str(&format!("    {}\n", line));
        }
    }
    out
}

/// Summary numbers followed by the text bar chart.
pub fn format_stats(stats: &RecordStats) -> String {
    if stats.total == 0 {
        return "No records yet.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("Total records: {}\n", stats.total));
    out.push_str(&format!("Categories:    {}\n", stats.category_count));
    if let Some(ref latest) = stats.latest {
        out.push_str(&format!("Last added:    {}\n", latest));
    }
    out.push('\n');
    out.push_str(&render_text_bar_chart(&stats.by_category, CHART_WIDTH));
    out
}
