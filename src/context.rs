//! The state of one build.
//!
//! [`BuildContext`] carries everything the pipeline stages read and write:
//! the project root, the tool config, the site config from `mkdocs.yml`, its
//! navigation tree (split out into typed nodes), and the variables loaded
//! from the data directory. Stages receive it by reference; nothing lives
//! beyond a single run.

use crate::config::ToolConfig;
use crate::data::{self, DataError, Variables};
use crate::mkdocs::{MkdocsConfig, lookup};
use crate::nav::{self, NavError};
use crate::types::NavTree;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{0} must contain a mapping at the top level")]
    NotAMapping(PathBuf),
    #[error("Invalid nav: {0}")]
    Nav(#[from] NavError),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone)]
pub struct BuildContext {
    pub project_root: PathBuf,
    pub config: ToolConfig,
    /// `mkdocs.yml` without its `nav` key.
    pub conf: MkdocsConfig,
    pub navigation: NavTree,
    pub variables: Variables,
    /// Set once an `internal` repo list has been seen.
    pub internal_subdoc: bool,
    /// Position of `nav` in `mkdocs.yml`, and whether it was left null.
    nav_slot: Option<(usize, bool)>,
}

impl BuildContext {
    /// Assemble a context from already-parsed parts.
    pub fn new(project_root: impl Into<PathBuf>, config: ToolConfig, mut raw: Mapping) -> Result<Self, ContextError> {
        let position = raw.iter().position(|(key, _)| key.as_str() == Some("nav"));
        let (navigation, nav_slot) = match (raw.shift_remove("nav"), position) {
            (Some(Value::Null), Some(index)) => (NavTree::new(), Some((index, true))),
            (Some(value), Some(index)) => (nav::nav_from_yaml(&value)?, Some((index, false))),
            _ => (NavTree::new(), None),
        };
        Ok(Self {
            project_root: project_root.into(),
            config,
            conf: MkdocsConfig::new(raw),
            navigation,
            variables: Variables::new(),
            internal_subdoc: false,
            nav_slot,
        })
    }

    /// Read `mkdocs.yml` and the data directory of a project.
    pub fn load(project_root: &Path, config: ToolConfig) -> Result<Self, ContextError> {
        let mkdocs_path = project_root.join(&config.mkdocs_file);
        let content =
            fs::read_to_string(&mkdocs_path).map_err(|e| ContextError::Io(mkdocs_path.clone(), e))?;
        let raw = match serde_yaml::from_str::<Value>(&content)? {
            Value::Mapping(raw) => raw,
            _ => return Err(ContextError::NotAMapping(mkdocs_path)),
        };

        let data_dir = project_root.join(&config.data_dir);
        let logo_dir = config.logo_dir.clone();
        let mut ctx = Self::new(project_root, config, raw)?;

        let loaded = data::load_data_dir(&data_dir, &logo_dir)?;
        for command in &loaded.setup_commands {
            ctx.conf.append_python_setup_command(command);
        }
        ctx.variables = loaded.variables;
        Ok(ctx)
    }

    /// Look up a variable by dotted path (`git_platform.url`).
    pub fn variable(&self, path: &str) -> Option<&Value> {
        lookup(&self.variables, path)
    }

    /// The site config with the navigation put back in place.
    ///
    /// `nav` returns to the position it had in `mkdocs.yml`, or goes last if
    /// it was absent and something was spliced in. A `nav` that was null and
    /// is still empty stays null.
    pub fn resolved_config(&self) -> Mapping {
        let raw = self.conf.raw();
        let nav = match self.nav_slot {
            Some((_, true)) if self.navigation.is_empty() => Value::Null,
            Some(_) => nav::nav_to_yaml(&self.navigation),
            None if self.navigation.is_empty() => return raw.clone(),
            None => nav::nav_to_yaml(&self.navigation),
        };
        let index = self.nav_slot.map_or(raw.len(), |(index, _)| index.min(raw.len()));

        let mut resolved = Mapping::new();
        let mut nav = Some(nav);
        for (i, (key, value)) in raw.iter().enumerate() {
            if i == index {
                if let Some(nav) = nav.take() {
                    resolved.insert(Value::String("nav".into()), nav);
                }
            }
            resolved.insert(key.clone(), value.clone());
        }
        if let Some(nav) = nav {
            resolved.insert(Value::String("nav".into()), nav);
        }
        resolved
    }

    /// Serialize the resolved site config.
    pub fn to_yaml(&self) -> Result<String, ContextError> {
        Ok(serde_yaml::to_string(&self.resolved_config())?)
    }

    /// Write the resolved site config to `path`.
    pub fn write(&self, path: &Path) -> Result<(), ContextError> {
        let yaml = self.to_yaml()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ContextError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(path, yaml).map_err(|e| ContextError::Io(path.to_path_buf(), e))
    }
}
