//! Typed access to the loosely structured `mkdocs.yml`.
//!
//! The site config stays a raw YAML mapping so keys this tool doesn't know
//! about (markdown extensions, extra CSS, python tags) pass through
//! untouched. [`MkdocsConfig`] adds just the reads and writes the pipeline
//! needs.
//!
//! ## Plugins
//!
//! mkdocs accepts plugins as a list whose items are either a bare name or a
//! single-key mapping of name to options:
//!
//! ```yaml
//! plugins:
//!   - search
//!   - monorepo
//!   - mkdocstrings:
//!       handlers:
//!         python:
//!           setup_commands:
//!             - import sys
//! ```
//!
//! A mapping of name to options is accepted too.

use serde_yaml::{Mapping, Value};

/// Whether a config value counts as "not set": absent, null, blank or empty.
pub fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Mapping(m)) => m.is_empty(),
        Some(Value::Sequence(s)) => s.is_empty(),
        Some(Value::Bool(b)) => !b,
        Some(_) => false,
    }
}

/// Look up a dotted path (`git_platform.url`) in a mapping.
pub fn lookup<'a>(root: &'a Mapping, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = root.get(parts.next()?)?;
    for part in parts {
        current = current.as_mapping()?.get(part)?;
    }
    Some(current)
}

/// Like [`lookup`], for string values.
pub fn lookup_str<'a>(root: &'a Mapping, path: &str) -> Option<&'a str> {
    lookup(root, path).and_then(Value::as_str)
}

/// Return the mapping stored under `key`, creating or replacing a non-mapping value.
fn mapping_entry<'a>(mapping: &'a mut Mapping, key: &str) -> &'a mut Mapping {
    let slot = mapping
        .entry(Value::String(key.to_string()))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if !slot.is_mapping() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(m) => m,
        _ => unreachable!("slot was just made a mapping"),
    }
}

/// The site configuration read from `mkdocs.yml`, minus its `nav` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MkdocsConfig {
    raw: Mapping,
}

impl MkdocsConfig {
    pub fn new(raw: Mapping) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Mapping {
        &self.raw
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.raw.get(key).and_then(Value::as_str)
    }

    /// Whether `key` is absent or holds an empty value.
    pub fn is_unset(&self, key: &str) -> bool {
        is_unset(self.raw.get(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.raw.insert(Value::String(key.to_string()), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.raw.shift_remove(key)
    }

    /// The `theme` mapping, converting `theme: material` to `{name: material}`.
    pub fn theme_mut(&mut self) -> &mut Mapping {
        if let Some(Value::String(name)) = self.raw.get("theme") {
            let mut theme = Mapping::new();
            theme.insert(Value::String("name".into()), Value::String(name.clone()));
            self.set("theme", Value::Mapping(theme));
        }
        mapping_entry(&mut self.raw, "theme")
    }

    // -------------------------------------------------------------------------
    // Plugins
    // -------------------------------------------------------------------------

    pub fn has_plugin(&self, name: &str) -> bool {
        match self.raw.get("plugins") {
            Some(Value::Sequence(items)) => items.iter().any(|item| plugin_name(item) == Some(name)),
            Some(Value::Mapping(map)) => map.contains_key(name),
            _ => false,
        }
    }

    /// Remove a plugin. Returns whether it was configured.
    pub fn remove_plugin(&mut self, name: &str) -> bool {
        match self.raw.get_mut("plugins") {
            Some(Value::Sequence(items)) => {
                let before = items.len();
                items.retain(|item| plugin_name(item) != Some(name));
                items.len() != before
            }
            Some(Value::Mapping(map)) => map.shift_remove(name).is_some(),
            _ => false,
        }
    }

    /// Options mapping of a configured plugin, promoting a bare name to `{name: {}}`.
    fn plugin_options_mut(&mut self, name: &str) -> Option<&mut Mapping> {
        let slot = match self.raw.get_mut("plugins")? {
            Value::Sequence(items) => {
                let item = items.iter_mut().find(|item| plugin_name(item) == Some(name))?;
                if item.is_string() {
                    let mut promoted = Mapping::new();
                    promoted.insert(Value::String(name.into()), Value::Mapping(Mapping::new()));
                    *item = Value::Mapping(promoted);
                }
                item.as_mapping_mut()?.get_mut(name)?
            }
            Value::Mapping(map) => map.get_mut(name)?,
            _ => return None,
        };
        if !slot.is_mapping() {
            *slot = Value::Mapping(Mapping::new());
        }
        slot.as_mapping_mut()
    }

    /// Append a python setup command to the mkdocstrings python handler.
    ///
    /// Returns `false` when mkdocstrings isn't configured.
    pub fn append_python_setup_command(&mut self, command: &str) -> bool {
        let Some(options) = self.plugin_options_mut("mkdocstrings") else {
            return false;
        };
        let handlers = mapping_entry(options, "handlers");
        let python = mapping_entry(handlers, "python");
        let commands = python
            .entry(Value::String("setup_commands".into()))
            .or_insert_with(|| Value::Sequence(Vec::new()));
        if !commands.is_sequence() {
            *commands = Value::Sequence(Vec::new());
        }
        if let Value::Sequence(list) = commands {
            list.push(Value::String(command.to_string()));
        }
        true
    }
}

fn plugin_name(item: &Value) -> Option<&str> {
    match item {
        Value::String(name) => Some(name),
        Value::Mapping(map) if map.len() == 1 => map.keys().next().and_then(Value::as_str),
        _ => None,
    }
}
