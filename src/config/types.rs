//! Configuration types and structures.

use crate::types::Category;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default port for the web dashboard.
pub const DEFAULT_UI_PORT: u16 = 31995;

/// Web dashboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Port for the web dashboard (default: 31995).
    #[serde(default = "default_ui_port")]
    pub port: u16,

    /// Initial retry delay in milliseconds when the port is busy (default: 15000).
    #[serde(default = "default_retry_initial_ms")]
    pub retry_initial_ms: u64,

    /// Jitter range in milliseconds for retry delay (default: 5000, meaning ±5s).
    #[serde(default = "default_retry_jitter_ms")]
    pub retry_jitter_ms: u64,

    /// Maximum retry interval in milliseconds (default: 240000 = 4 minutes).
    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Exponential backoff multiplier (default: 2.0).
    #[serde(default = "default_retry_multiplier")]
    pub retry_multiplier: f64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            port: default_ui_port(),
            retry_initial_ms: default_retry_initial_ms(),
            retry_jitter_ms: default_retry_jitter_ms(),
            retry_max_ms: default_retry_max_ms(),
            retry_multiplier: default_retry_multiplier(),
        }
    }
}

fn default_ui_port() -> u16 {
    DEFAULT_UI_PORT
}

fn default_retry_initial_ms() -> u64 {
    15_000
}

fn default_retry_jitter_ms() -> u64 {
    5_000
}

fn default_retry_max_ms() -> u64 {
    240_000
}

fn default_retry_multiplier() -> f64 {
    2.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            ui: UiConfig::default(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("recordbook/records.db")
}

/// Record entry and import behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Category preselected in the add form and used by `add` without `--category`.
    #[serde(default)]
    pub default_category: Category,

    /// Rows shown in an import preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            default_category: Category::default(),
            preview_rows: default_preview_rows(),
        }
    }
}

fn default_preview_rows() -> usize {
    crate::csv_io::DEFAULT_PREVIEW_ROWS
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Compress CLI exports larger than this (e.g. `1MB`). Unset disables it.
    #[serde(default)]
    pub gzip_threshold: Option<String>,
}

impl ExportConfig {
    pub fn gzip_threshold_bytes(&self) -> Option<u64> {
        self.gzip_threshold.as_deref().and_then(parse_size)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub records: RecordsConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports: B, KB, MB, GB (case-insensitive)
pub fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();

    let (num, unit) = if let Some(num) = s.strip_suffix("GB") {
        (num, 1024 * 1024 * 1024)
    } else if let Some(num) = s.strip_suffix("MB") {
        (num, 1024 * 1024)
    } else if let Some(num) = s.strip_suffix("KB") {
        (num, 1024)
    } else if let Some(num) = s.strip_suffix('B') {
        (num, 1)
    } else {
        (s.as_str(), 1)
    };

    // Sizes that overflow u64 are rejected
    num.trim().parse::<u64>().ok()?.checked_mul(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.db_path, PathBuf::from("recordbook/records.db"));
        assert_eq!(config.server.ui.port, DEFAULT_UI_PORT);
        assert_eq!(config.records.default_category, Category::Honor);
        assert_eq!(config.records.preview_rows, 5);
        assert!(config.export.gzip_threshold_bytes().is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str(
            "records:\n  default_category: certificate\nexport:\n  gzip_threshold: 2KB\n",
        )
        .unwrap();
        assert_eq!(config.records.default_category, Category::Certificate);
        assert_eq!(config.records.preview_rows, 5);
        assert_eq!(config.export.gzip_threshold_bytes(), Some(2048));
        assert_eq!(config.server.ui.retry_initial_ms, 15_000);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("100"), Some(100));
        assert_eq!(parse_size("100B"), Some(100));
        assert_eq!(parse_size("1kb"), Some(1024));
        assert_eq!(parse_size(" 3 MB "), Some(3 * 1024 * 1024));
        assert_eq!(parse_size("1GB"), Some(1024 * 1024 * 1024));
        assert_eq!(parse_size("lots"), None);
    }

    #[test]
    fn test_parse_size_rejects_overflow() {
        assert_eq!(parse_size("17179869183GB"), Some(17179869183 * 1024 * 1024 * 1024));
        assert_eq!(parse_size("17179869184GB"), None);
        assert_eq!(parse_size("99999999999999999MB"), None);
        assert_eq!(parse_size("18446744073709551615"), Some(u64::MAX));
    }
}
