//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Every entity (nav node, sub-repo, version) leads with its positional
//! index and title. Paths, URLs and outcomes follow as secondary context,
//! either after an arrow or on indented lines.
//!
//! # Output Format
//!
//! ## Nav
//!
//! ```text
//! 001 Home → index.md
//! 002 Libraries
//!     001 Core → !include /srv/docs/libs/core/mkdocs.yml
//!     002 Site → https://site.test
//! ```
//!
//! ## Fetch
//!
//! ```text
//! Sub-repos
//! 001 core (internal, cloned)
//!     Source: libs/core
//!     Variables: core
//! ```
//!
//! ## Versions
//!
//! ```text
//! Versions
//! 001 1.2 → 1.2.3 [latest]
//! 002 1.1 → 1.1.0
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::pipeline::BuildReport;
use crate::subrepo::{FetchOutcome, FetchReport};
use crate::types::{NavNode, NavTree};
use crate::versions::VersionEntry;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn outcome_label(outcome: FetchOutcome) -> &'static str {
    match outcome {
        FetchOutcome::Cloned => "cloned",
        FetchOutcome::Pulled => "pulled",
        FetchOutcome::Skipped => "not fetched",
    }
}

/// Show `path` relative to `root` when it lives under it.
fn relative<'a>(path: &'a Path, root: &Path) -> std::borrow::Cow<'a, str> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
}

// ============================================================================
// Nav
// ============================================================================

/// Format a nav tree, one line per node.
pub fn format_nav(tree: &NavTree) -> Vec<String> {
    let mut lines = Vec::new();
    format_nav_level(tree, 0, &mut lines);
    lines
}

fn format_nav_level(tree: &NavTree, depth: usize, lines: &mut Vec<String>) {
    for (i, node) in tree.iter().enumerate() {
        let prefix = format!("{}{}", indent(depth), format_index(i + 1));
        match node {
            NavNode::Page(target) => lines.push(format!("{prefix} ({target})")),
            NavNode::Leaf { title, target } => lines.push(format!("{prefix} {title} → {target}")),
            NavNode::Branch { title, children } => {
                lines.push(format!("{prefix} {title}"));
                format_nav_level(children, depth + 1, lines);
            }
        }
    }
}

pub fn print_nav(tree: &NavTree) {
    for line in format_nav(tree) {
        println!("{}", line);
    }
}

// ============================================================================
// Fetch
// ============================================================================

/// Format the sub-repos handled by the fetch stage.
pub fn format_fetch_reports(reports: &[FetchReport], project_root: &Path) -> Vec<String> {
    if reports.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["Sub-repos".to_string()];
    for (i, report) in reports.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            report.name,
            report.kind.key(),
            outcome_label(report.outcome)
        ));
        lines.push(format!("    Source: {}", relative(&report.dir, project_root)));
        if !report.keys.is_empty() {
            lines.push(format!("    Variables: {}", report.keys.join(", ")));
        }
    }
    lines
}

// ============================================================================
// Versions
// ============================================================================

pub fn format_versions(entries: &[VersionEntry]) -> Vec<String> {
    let mut lines = vec!["Versions".to_string()];
    if entries.is_empty() {
        lines.push("    (no release tags)".to_string());
    }
    for (i, entry) in entries.iter().enumerate() {
        let aliases = if entry.aliases.is_empty() {
            String::new()
        } else {
            format!(" [{}]", entry.aliases.join(", "))
        };
        lines.push(format!(
            "{} {} → {}{}",
            format_index(i + 1),
            entry.version,
            entry.title,
            aliases
        ));
    }
    lines
}

pub fn print_versions(entries: &[VersionEntry]) {
    for line in format_versions(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Build summary
// ============================================================================

/// Format the full result of a pipeline run.
pub fn format_build_report(report: &BuildReport, project_root: &Path) -> Vec<String> {
    let mut lines = vec![format!("Repo: {}", report.slug)];

    let fetched = format_fetch_reports(&report.fetched, project_root);
    if !fetched.is_empty() {
        lines.push(String::new());
        lines.extend(fetched);
    }

    if let Some(entries) = &report.versions {
        lines.push(String::new());
        lines.extend(format_versions(entries));
        if let Some(path) = &report.versions_file {
            lines.push(format!("    Written: {}", relative(path, project_root)));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Spliced {} nav {}",
        report.leaves_added,
        if report.leaves_added == 1 { "entry" } else { "entries" }
    ));
    if report.monorepo_removed {
        lines.push("Removed monorepo plugin (no internal sub-repos)".to_string());
    }
    lines
}

pub fn print_build_report(report: &BuildReport, project_root: &Path) {
    for line in format_build_report(report, project_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
