//! Repo descriptor parsing.
//!
//! The `subrepo` variable declares where sub-repositories live and where
//! their documentation goes in the navigation:
//!
//! ```yaml
//! subrepo:
//!   libs:                      # structural segment: repos live in libs/
//!     nav_entry: Libraries     # branch title for everything at this level
//!     internal:
//!       - name: core
//!         nav_entry: Core
//!         git_url: https://git.example.com/core.git
//!     tools:                   # nested segment: libs/tools/
//!       nav_entry: Tools       # nested branch: Libraries > Tools
//!       external:
//!         - name: cli
//!           online_url: https://cli.example.com
//! ```
//!
//! Every key that is not `nav_entry`, `internal` or `external` is a
//! structural segment. Segments nest the on-disk location; `nav_entry` values
//! nest the navigation titles. The two paths are tracked separately.
//!
//! A level that lists repos needs a `nav_entry` of its own or on one of
//! its ancestors. Repos with an empty title path would land at the top of
//! the navigation, so parsing rejects them.

use crate::types::{RepoKind, RepoRecord};
use serde_yaml::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("Descriptor at '{0}' must be a mapping")]
    NotAMapping(String),
    #[error("Descriptor key at '{0}' must be a string")]
    NonStringKey(String),
    #[error("nav_entry at '{0}' must be a string")]
    InvalidNavEntry(String),
    #[error("Descriptor at '{0}' lists repos but neither it nor a parent has a nav_entry")]
    MissingNavEntry(String),
    #[error("Invalid repo list at '{path}': {source}")]
    InvalidRecords {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One non-`nav_entry` key of a descriptor level, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorEntry {
    Repos(RepoKind, Vec<RepoRecord>),
    Segment(String, RepoDescriptor),
}

/// A parsed descriptor level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoDescriptor {
    pub nav_entry: Option<String>,
    pub entries: Vec<DescriptorEntry>,
}

impl RepoDescriptor {
    /// Parse a descriptor from the raw `subrepo` variable.
    pub fn from_yaml(value: &Value) -> Result<Self, DescriptorError> {
        parse_level(value, &[], false)
    }

    /// Whether any level declares an `internal` list.
    pub fn has_internal(&self) -> bool {
        self.entries.iter().any(|entry| match entry {
            DescriptorEntry::Repos(kind, _) => *kind == RepoKind::Internal,
            DescriptorEntry::Segment(_, child) => child.has_internal(),
        })
    }

    /// Total number of repo records across all levels.
    pub fn record_count(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| match entry {
                DescriptorEntry::Repos(_, records) => records.len(),
                DescriptorEntry::Segment(_, child) => child.record_count(),
            })
            .sum()
    }
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "subrepo".to_string()
    } else {
        format!("subrepo.{}", path.join("."))
    }
}

fn parse_level(
    value: &Value,
    path: &[String],
    inherited_title: bool,
) -> Result<RepoDescriptor, DescriptorError> {
    let mapping = value
        .as_mapping()
        .ok_or_else(|| DescriptorError::NotAMapping(display_path(path)))?;

    // nav_entry may follow the keys it applies to
    let nav_entry = match mapping.get("nav_entry") {
        Some(title) => Some(
            title
                .as_str()
                .ok_or_else(|| DescriptorError::InvalidNavEntry(display_path(path)))?
                .to_string(),
        ),
        None => None,
    };
    let titled = inherited_title || nav_entry.is_some();

    let mut descriptor = RepoDescriptor {
        nav_entry,
        entries: Vec::new(),
    };
    for (key, child) in mapping {
        let key = key
            .as_str()
            .ok_or_else(|| DescriptorError::NonStringKey(display_path(path)))?;
        match key {
            "nav_entry" => {}
            "internal" | "external" => {
                if !titled {
                    return Err(DescriptorError::MissingNavEntry(display_path(path)));
                }
                let kind = if key == "internal" {
                    RepoKind::Internal
                } else {
                    RepoKind::External
                };
                let records: Vec<RepoRecord> = serde_yaml::from_value(child.clone())
                    .map_err(|source| DescriptorError::InvalidRecords {
                        path: format!("{}.{}", display_path(path), key),
                        source,
                    })?;
                descriptor.entries.push(DescriptorEntry::Repos(kind, records));
            }
            segment => {
                let mut child_path = path.to_vec();
                child_path.push(segment.to_string());
                let nested = parse_level(child, &child_path, titled)?;
                descriptor
                    .entries
                    .push(DescriptorEntry::Segment(segment.to_string(), nested));
            }
        }
    }

    Ok(descriptor)
}
