//! HTML templates for the web dashboard.
//!
//! Templates are embedded at compile time using `include_str!` and filled by
//! replacing `{{placeholder}}` markers.

use super::server::{category_options, field_options};
use crate::config::RecordsConfig;

/// The records page: summary, filters, table and the add/update/import forms.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Render the index page with option lists and defaults filled in.
pub fn render_index(records: &RecordsConfig) -> String {
    INDEX_TEMPLATE
        .replace("{{version}}", env!("CARGO_PKG_VERSION"))
        .replace(
            "{{category_options}}",
            &category_options(records.default_category),
        )
        .replace("{{field_options}}", &field_options())
        .replace("{{preview_rows}}", &records.preview_rows.to_string())
}
