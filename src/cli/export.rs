//! Export subcommand.
//!
//! Writes the matching records as CSV, by default to a timestamped file in
//! the current directory.

use super::query::QueryArgs;
use crate::config::parse_size;
use crate::csv_io::export_file_name;
use chrono::{DateTime, TimeZone};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export subcommand
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path (default: generated name in the current directory)
    #[arg(short, long, value_name = "FILE", conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Write to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Force gzip compression (auto-detected from .gz extension otherwise)
    #[arg(long)]
    pub gzip: bool,

    /// Automatically compress if output exceeds this size
    ///
    /// Accepts human-readable sizes: 100KB, 1MB, etc. Overrides
    /// `export.gzip_threshold` from the config.
    #[arg(long, value_name = "SIZE", value_parser = parse_threshold)]
    pub compress_threshold: Option<u64>,

    #[command(flatten)]
    pub query: QueryArgs,
}

/// Parse `--compress-threshold` so a malformed size fails argument parsing.
fn parse_threshold(s: &str) -> Result<u64, String> {
    parse_size(s).ok_or_else(|| format!("invalid size '{}' (expected e.g. 500KB, 1MB, 2GB)", s))
}

impl ExportArgs {
    /// Threshold from the flag, falling back to the configured one.
    pub fn compress_threshold_bytes(&self, configured: Option<u64>) -> Option<u64> {
        self.compress_threshold.or(configured)
    }

    /// Determine if output should be compressed based on args and filename
    pub fn should_compress(&self, threshold: Option<u64>, output_size: u64) -> bool {
        // Explicit --gzip flag always wins
        if self.gzip {
            return true;
        }

        if let Some(ref path) = self.output
            && path.extension().is_some_and(|ext| ext == "gz")
        {
            return true;
        }

        // stdout is only compressed on request
        if self.stdout {
            return false;
        }

        matches!(threshold, Some(limit) if output_size > limit)
    }

    /// File to write, or `None` for stdout. A `.gz` suffix is added when
    /// compressing.
    pub fn output_path<Tz: TimeZone>(
        &self,
        filtered: bool,
        now: &DateTime<Tz>,
        compress: bool,
    ) -> Option<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        if self.stdout {
            return None;
        }

        let path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(export_file_name(filtered, now)));

        if compress && !path.extension().is_some_and(|ext| ext == "gz") {
            let mut name = path.into_os_string();
            name.push(".gz");
            Some(PathBuf::from(name))
        } else {
            Some(path)
        }
    }
}
