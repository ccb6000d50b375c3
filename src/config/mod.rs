//! Layered configuration.
//!
//! Tiers, lowest priority first, merged field-by-field:
//! 1. **Defaults** - built into [`Config::default`]
//! 2. **Project** - `$CWD/recordbook/config.yaml`
//! 3. **User** - `~/.recordbook/config.yaml`
//!
//! `RECORDBOOK_DB_PATH` overrides the merged result, and command-line flags
//! are applied on top of that by the binary.
//!
//! ## Environment Variables
//! - `RECORDBOOK_CONFIG_PATH` - Explicit config file (replaces project and user tiers)
//! - `RECORDBOOK_DB_PATH` - Database path
//! - `RECORDBOOK_USER_DIR` - User config dir (default: `~/.recordbook`)
//! - `RECORDBOOK_PROJECT_DIR` - Project config dir (default: `./recordbook`)

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
