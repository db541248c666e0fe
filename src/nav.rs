//! Navigation tree merging.
//!
//! Splices sub-repository entries into the `nav:` tree of `mkdocs.yml`.
//! Three pieces cooperate:
//!
//! - [`ensure_branch`] resolves a list of titles to a nested submenu,
//!   creating empty branches for titles that don't exist yet.
//! - [`install_internal`] / [`install_external`] append one leaf to that
//!   submenu: an `!include` directive for the monorepo plugin, or a plain URL.
//! - [`update_nav`] walks a [`RepoDescriptor`], threading the title path and
//!   the on-disk segment path through the recursion.
//!
//! Merging only ever appends or descends. Existing entries keep their
//! relative order, and a title that already exists at a level is reused, so
//! several descriptors can contribute to the same section.
//!
//! ## YAML shape
//!
//! ```yaml
//! nav:
//!   - index.md                       # NavNode::Page
//!   - Home: index.md                 # NavNode::Leaf
//!   - Libraries:                     # NavNode::Branch
//!       - Core: '!include /abs/libs/core/mkdocs.yml'
//! ```

use crate::descriptor::{DescriptorEntry, RepoDescriptor};
use crate::types::{NavNode, NavTree, RepoKind, RepoRecord};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix understood by the mkdocs monorepo plugin.
pub const INCLUDE_DIRECTIVE: &str = "!include";

#[derive(Error, Debug)]
pub enum NavError {
    #[error("Nav entry '{0}' is a link, cannot nest entries under it")]
    NotABranch(String),
    #[error("External repo '{0}' has no online_url")]
    MissingOnlineUrl(String),
    #[error("nav must be a list")]
    NotAList,
    #[error("Invalid nav item: {0}")]
    InvalidItem(String),
}

/// Where internal repos live and which config file to include from them.
#[derive(Debug, Clone)]
pub struct SpliceLayout<'a> {
    pub project_root: &'a Path,
    pub include_file: &'a str,
}

/// Resolve `path` to a nested submenu, creating missing branches.
///
/// Each segment is looked up by title among the current level's nodes. A
/// match is descended into; a miss appends `{segment: []}` and descends into
/// the new, empty list. An empty path returns the top-level tree.
pub fn ensure_branch<'a>(tree: &'a mut NavTree, path: &[String]) -> Result<&'a mut NavTree, NavError> {
    let mut current = tree;
    for segment in path {
        let index = match current
            .iter()
            .position(|node| node.title() == Some(segment.as_str()))
        {
            Some(index) => index,
            None => {
                current.push(NavNode::branch(segment.clone(), Vec::new()));
                current.len() - 1
            }
        };
        current = match &mut current[index] {
            NavNode::Branch { children, .. } => children,
            _ => return Err(NavError::NotABranch(segment.clone())),
        };
    }
    Ok(current)
}

/// Path of the mkdocs config an internal repo is included from.
///
/// `<project_root>/<segments...>/<name>/<subpath?>/<include_file>`
pub fn include_path(layout: &SpliceLayout<'_>, segments: &[String], record: &RepoRecord) -> PathBuf {
    let mut path = layout.project_root.to_path_buf();
    path.extend(segments);
    path.push(&record.name);
    if let Some(subpath) = &record.subpath {
        path.push(subpath);
    }
    path.push(layout.include_file);
    path
}

/// Append an `!include` leaf for an internal repo. Returns the included path.
pub fn install_internal(
    branch: &mut NavTree,
    layout: &SpliceLayout<'_>,
    segments: &[String],
    record: &RepoRecord,
) -> PathBuf {
    let path = include_path(layout, segments, record);
    branch.push(NavNode::leaf(
        record.title(),
        format!("{INCLUDE_DIRECTIVE} {}", path.display()),
    ));
    path
}

/// Append a leaf pointing at an external repo's published site, verbatim.
pub fn install_external(branch: &mut NavTree, record: &RepoRecord) -> Result<(), NavError> {
    let url = record
        .online_url
        .as_ref()
        .ok_or_else(|| NavError::MissingOnlineUrl(record.name.clone()))?;
    branch.push(NavNode::leaf(record.title(), url.clone()));
    Ok(())
}

/// Splice every repo of `descriptor` into `tree`. Returns the number of leaves added.
///
/// Paths are always resolved from the tree root: both accumulators start
/// empty on every call.
pub fn update_nav(
    tree: &mut NavTree,
    layout: &SpliceLayout<'_>,
    descriptor: &RepoDescriptor,
) -> Result<usize, NavError> {
    walk(tree, layout, descriptor, &[], &[])
}

fn walk(
    tree: &mut NavTree,
    layout: &SpliceLayout<'_>,
    level: &RepoDescriptor,
    titles: &[String],
    segments: &[String],
) -> Result<usize, NavError> {
    let mut titles = titles.to_vec();
    if let Some(title) = &level.nav_entry {
        titles.push(title.clone());
    }

    let mut added = 0;
    for entry in &level.entries {
        match entry {
            DescriptorEntry::Repos(kind, records) => {
                for record in records {
                    let branch = ensure_branch(tree, &titles)?;
                    match kind {
                        RepoKind::Internal => {
                            install_internal(branch, layout, segments, record);
                        }
                        RepoKind::External => install_external(branch, record)?,
                    }
                    added += 1;
                }
            }
            DescriptorEntry::Segment(name, child) => {
                let mut nested = segments.to_vec();
                nested.push(name.clone());
                added += walk(tree, layout, child, &titles, &nested)?;
            }
        }
    }
    Ok(added)
}

// =============================================================================
// YAML conversion
// =============================================================================

/// Build a nav tree from the raw `nav:` value of `mkdocs.yml`.
pub fn nav_from_yaml(value: &Value) -> Result<NavTree, NavError> {
    let items = value.as_sequence().ok_or(NavError::NotAList)?;
    items.iter().map(node_from_yaml).collect()
}

fn node_from_yaml(item: &Value) -> Result<NavNode, NavError> {
    match item {
        Value::String(page) => Ok(NavNode::Page(page.clone())),
        Value::Mapping(mapping) if mapping.len() == 1 => {
            let (key, value) = mapping
                .iter()
                .next()
                .ok_or_else(|| NavError::InvalidItem("empty mapping".into()))?;
            let title = key
                .as_str()
                .ok_or_else(|| NavError::InvalidItem(format!("non-string title {key:?}")))?
                .to_string();
            match value {
                Value::String(target) => Ok(NavNode::Leaf {
                    title,
                    target: target.clone(),
                }),
                // Unquoted `Title: !include path` parses as a tagged scalar
                Value::Tagged(tagged) => match &tagged.value {
                    Value::String(target) => Ok(NavNode::Leaf {
                        title,
                        target: format!("{} {}", tagged.tag, target),
                    }),
                    other => Err(NavError::InvalidItem(format!("{title}: {other:?}"))),
                },
                Value::Sequence(_) => Ok(NavNode::Branch {
                    title,
                    children: nav_from_yaml(value)?,
                }),
                other => Err(NavError::InvalidItem(format!("{title}: {other:?}"))),
            }
        }
        other => Err(NavError::InvalidItem(format!("{other:?}"))),
    }
}

/// Convert a nav tree back to the YAML shape mkdocs expects.
pub fn nav_to_yaml(tree: &NavTree) -> Value {
    Value::Sequence(tree.iter().map(node_to_yaml).collect())
}

fn node_to_yaml(node: &NavNode) -> Value {
    match node {
        NavNode::Page(page) => Value::String(page.clone()),
        NavNode::Leaf { title, target } => {
            let mut mapping = Mapping::new();
            mapping.insert(Value::String(title.clone()), Value::String(target.clone()));
            Value::Mapping(mapping)
        }
        NavNode::Branch { title, children } => {
            let mut mapping = Mapping::new();
            mapping.insert(Value::String(title.clone()), nav_to_yaml(children));
            Value::Mapping(mapping)
        }
    }
}
