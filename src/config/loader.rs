//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Tier a config file was read from, lowest priority first.
///
/// Built-in defaults sit below every tier; `RECORDBOOK_DB_PATH` and CLI
/// flags sit above them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Project-level config ($CWD/recordbook/)
    Project,
    /// User-level config (~/.recordbook/)
    User,
    /// File named by `--config` or `RECORDBOOK_CONFIG_PATH`
    Explicit,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Explicit => write!(f, "explicit"),
        }
    }
}

/// Where each configuration tier lives.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
    /// Explicit config file; replaces the project and user tiers
    pub config_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: RECORDBOOK_USER_DIR or ~/.recordbook
        let user_dir = std::env::var("RECORDBOOK_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".recordbook")));

        // Project dir: RECORDBOOK_PROJECT_DIR or $CWD/recordbook
        let project_dir = std::env::var("RECORDBOOK_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("recordbook")));

        let config_file = std::env::var("RECORDBOOK_CONFIG_PATH").ok().map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            config_file,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            config_file: None,
        }
    }

    /// Use a specific config file instead of the project and user tiers.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<(ConfigTier, PathBuf)>,
}

/// Read a YAML file as a JSON value for merging. Missing files yield `None`;
/// unreadable or malformed ones are logged and skipped.
fn read_tier(path: &Path) -> Option<Value> {
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Value>(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed config {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            warn!("Cannot read config {}: {}", path.display(), e);
            None
        }
    }
}

impl ConfigLoader {
    /// Load configuration from the tiers in `paths`, merged over the defaults.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut configs: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();

        if let Some(ref explicit) = paths.config_file {
            // An explicit file must exist and parse
            let content = std::fs::read_to_string(explicit)
                .with_context(|| format!("reading config {}", explicit.display()))?;
            let value: Value = serde_yaml::from_str(&content)
                .with_context(|| format!("parsing config {}", explicit.display()))?;
            configs.push(value);
            sources.push((ConfigTier::Explicit, explicit.clone()));
        } else {
            for (tier, dir) in [
                (ConfigTier::Project, &paths.project_dir),
                (ConfigTier::User, &paths.user_dir),
            ] {
                let Some(dir) = dir else { continue };
                let file = dir.join("config.yaml");
                if let Some(value) = read_tier(&file) {
                    debug!(%tier, path = %file.display(), "Loaded config tier");
                    configs.push(value);
                    sources.push((tier, file));
                }
            }
        }

        let merged = deep_merge_all(configs);
        let mut config: Config = serde_json::from_value(merged)?;

        Self::apply_env_overrides(&mut config);

        Ok(Self { config, sources })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(db_path) = std::env::var("RECORDBOOK_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[(ConfigTier, PathBuf)] {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.config().records.preview_rows, 5);
        assert_eq!(loader.config().server.ui.port, 31995);
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("recordbook");
        let user_dir = temp.path().join("user");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::create_dir_all(&user_dir).unwrap();

        std::fs::write(
            project_dir.join("config.yaml"),
            "server:\n  ui:\n    port: 4000\nrecords:\n  preview_rows: 10\n",
        )
        .unwrap();
        std::fs::write(
            user_dir.join("config.yaml"),
            "records:\n  preview_rows: 3\n  default_category: account\n",
        )
        .unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.server.ui.port, 4000);
        assert_eq!(config.records.preview_rows, 3);
        assert_eq!(config.records.default_category, Category::Account);
        let tiers: Vec<ConfigTier> = loader.sources().iter().map(|(t, _)| *t).collect();
        assert_eq!(tiers, vec![ConfigTier::Project, ConfigTier::User]);
    }

    #[test]
    fn test_malformed_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("recordbook");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "server: [unclosed").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        assert_eq!(loader.config().records.preview_rows, 5);
    }

    #[test]
    fn test_explicit_config_file_replaces_tiers() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("recordbook");
        std::fs::create_dir_all(&project_dir).unwrap();
        std::fs::write(project_dir.join("config.yaml"), "records:\n  preview_rows: 9\n").unwrap();

        let explicit = temp.path().join("custom.yaml");
        std::fs::write(&explicit, "export:\n  gzip_threshold: 1MB\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None).with_config_file(&explicit);
        let loader = ConfigLoader::load_with_paths(paths).unwrap();
        let config = loader.config();

        assert_eq!(config.records.preview_rows, 5);
        assert_eq!(config.export.gzip_threshold_bytes(), Some(1024 * 1024));
        assert_eq!(loader.sources(), &[(ConfigTier::Explicit, explicit)]);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(None, None).with_config_file(temp.path().join("nope.yaml"));
        assert!(ConfigLoader::load_with_paths(paths).is_err());
    }
}
