//! Tool configuration module.
//!
//! Handles loading, validating, and merging `monodocs.toml`. The file is
//! optional: stock defaults cover the conventional mkdocs project layout, and
//! a user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! project/
//! ├── monodocs.toml            # Tool config (optional)
//! ├── mkdocs.yml               # Input site config
//! └── docs/
//!     ├── _data/               # Variables and the subrepo descriptor
//!     └── versions.json        # Written when version.provider is "mike"
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! mkdocs_file = "mkdocs.yml"            # Site config to read
//! output_file = "mkdocs.resolved.yml"   # Resolved site config to write
//! data_dir = "docs/_data"               # Variable files, also inside sub-repos
//! versions_file = "docs/versions.json"  # Version manifest location
//! include_file = "mkdocs.yml"           # Config included from internal sub-repos
//! logo_dir = "assets/img/meta"          # Where default <name>_logo.png files live
//!
//! [fetch]
//! enabled = true                        # Clone/pull sub-repos before splicing
//! remote = "origin"                     # Remote used for the repo slug and pulls
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the tool config file in the project root.
pub const CONFIG_FILENAME: &str = "monodocs.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `monodocs.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// Site config read as input, relative to the project root.
    pub mkdocs_file: String,
    /// Resolved site config written by `build`, relative to the project root.
    pub output_file: String,
    /// Directory holding variable files, relative to the project (or sub-repo) root.
    pub data_dir: String,
    /// Version manifest path, relative to the project root.
    pub versions_file: String,
    /// Config file included from each internal sub-repository.
    pub include_file: String,
    /// Directory of default logos, relative to each site root.
    pub logo_dir: String,
    /// Sub-repository fetch settings.
    pub fetch: FetchConfig,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            mkdocs_file: "mkdocs.yml".to_string(),
            output_file: "mkdocs.resolved.yml".to_string(),
            data_dir: "docs/_data".to_string(),
            versions_file: "docs/versions.json".to_string(),
            include_file: "mkdocs.yml".to_string(),
            logo_dir: "assets/img/meta".to_string(),
            fetch: FetchConfig::default(),
        }
    }
}

/// Sub-repository fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Clone missing sub-repos and pull existing ones.
    pub enabled: bool,
    /// Remote name used for pulls and for the project's repo slug.
    pub remote: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            remote: "origin".to_string(),
        }
    }
}

fn is_yaml_name(name: &str) -> bool {
    name.ends_with(".yml") || name.ends_with(".yaml")
}

impl ToolConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("mkdocs_file", &self.mkdocs_file),
            ("output_file", &self.output_file),
            ("data_dir", &self.data_dir),
            ("versions_file", &self.versions_file),
            ("include_file", &self.include_file),
            ("fetch.remote", &self.fetch.remote),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if !is_yaml_name(&self.mkdocs_file) || !is_yaml_name(&self.include_file) {
            return Err(ConfigError::Validation(
                "mkdocs_file and include_file must be .yml or .yaml files".into(),
            ));
        }
        if self.output_file == self.mkdocs_file {
            return Err(ConfigError::Validation(
                "output_file must differ from mkdocs_file".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ToolConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `monodocs.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ToolConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ToolConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the tool config of a project: stock defaults plus `monodocs.toml`.
pub fn load_config(root: &Path) -> Result<ToolConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `monodocs.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# monodocs configuration
# ======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Site config read as input (relative to the project root).
mkdocs_file = "mkdocs.yml"

# Resolved site config written by `monodocs build`.
# Point mkdocs at it: mkdocs build -f mkdocs.resolved.yml
output_file = "mkdocs.resolved.yml"

# Directory of YAML variable files. Every top-level key of every file
# becomes a variable. The same layout is expected inside sub-repositories.
data_dir = "docs/_data"

# Where the version manifest is written when version.provider is "mike".
versions_file = "docs/versions.json"

# Config file each internal sub-repository is included from.
include_file = "mkdocs.yml"

# Directory of default <name>_logo.png files, relative to each site root.
logo_dir = "assets/img/meta"

# ---------------------------------------------------------------------------
# Sub-repository fetching
# ---------------------------------------------------------------------------
[fetch]
# Clone missing sub-repositories and pull existing ones before splicing.
# Disable for offline builds (same as passing --no-fetch).
enabled = true

# Remote used for pulls and for deriving the project's repo slug.
remote = "origin"
"##
}
