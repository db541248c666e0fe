//! Version manifest for the `mike` versioning provider.
//!
//! When the variables contain `version: {provider: mike}`, the release tags
//! of the repository are condensed into `docs/versions.json`, one entry per
//! `major.minor` line with the highest patch as its title, newest first:
//!
//! ```json
//! [
//!   { "version": "1.2", "title": "1.2.3", "aliases": ["latest"] },
//!   { "version": "1.1", "title": "1.1.0", "aliases": [] }
//! ]
//! ```
//!
//! Tags are read as `<anything>v<major>.<minor>.<patch>[.<more>]`, so
//! `v1.2.3` and `release-v1.2.3` both count. Tags that don't fit are
//! skipped with a warning.

use crate::data::Variables;
use crate::mkdocs::lookup_str;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Alias given to the newest version line.
pub const LATEST_ALIAS: &str = "latest";

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A release parsed from a tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// One entry of `versions.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub title: String,
    pub aliases: Vec<String>,
}

/// Whether the variables select the `mike` provider.
pub fn mike_enabled(variables: &Variables) -> bool {
    lookup_str(variables, "version.provider") == Some("mike")
}

/// Parse a tag name. Everything up to the last `v` is ignored.
pub fn parse_tag(tag: &str) -> Option<TagVersion> {
    let start = tag.rfind('v').map(|i| i + 1).unwrap_or(0);
    let mut parts = tag[start..].split('.');
    let mut next = || parts.next()?.parse::<u32>().ok();
    Some(TagVersion {
        major: next()?,
        minor: next()?,
        patch: next()?,
    })
}

/// Condense tags into manifest entries, newest line first.
pub fn build_manifest(tags: &[String]) -> Vec<VersionEntry> {
    let mut lines: BTreeMap<(u32, u32), u32> = BTreeMap::new();
    for tag in tags {
        match parse_tag(tag) {
            Some(v) => {
                let patch = lines.entry((v.major, v.minor)).or_insert(v.patch);
                *patch = (*patch).max(v.patch);
            }
            None => tracing::warn!("Ignoring tag '{tag}': not a vMAJOR.MINOR.PATCH release"),
        }
    }

    lines
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, ((major, minor), patch))| VersionEntry {
            version: format!("{major}.{minor}"),
            title: format!("{major}.{minor}.{patch}"),
            aliases: if i == 0 {
                vec![LATEST_ALIAS.to_string()]
            } else {
                Vec::new()
            },
        })
        .collect()
}

/// Write the manifest as 2-space indented JSON.
pub fn write_manifest(path: &Path, entries: &[VersionEntry]) -> Result<(), VersionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(entries)?;
    fs::write(path, json + "\n")?;
    Ok(())
}
