//! Import subcommand.
//!
//! Reads a CSV (optionally gzip-compressed) and adds every row that has a
//! title as a new record.

use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import (`.csv` or `.csv.gz`)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Show a preview of the first rows without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Rows to show in the preview (default: `records.preview_rows`)
    #[arg(long, value_name = "N")]
    pub preview_rows: Option<usize>,
}

impl ImportArgs {
    pub fn preview_limit(&self, configured: usize) -> usize {
        self.preview_rows.unwrap_or(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_limit() {
        let mut args = ImportArgs {
            file: PathBuf::from("records.csv"),
            dry_run: true,
            preview_rows: None,
        };
        assert_eq!(args.preview_limit(5), 5);
        args.preview_rows = Some(2);
        assert_eq!(args.preview_limit(5), 2);
    }
}
