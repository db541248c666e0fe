//! Sub-repository fetching and data loading.
//!
//! Before the navigation can be spliced, every repo named in the descriptor
//! has to be on disk and its own data file merged into the variables. Repos
//! live under the project root at the path spelled by the descriptor's
//! structural segments:
//!
//! ```text
//! subrepo:                       project/
//!   libs:                        └── libs/
//!     nav_entry: Libraries           ├── core/        ← internal, cloned/pulled
//!     internal:                      │   └── docs/_data/core.yaml
//!       - name: core                 └── site/        ← external, cloned/pulled
//!     external:                          └── docs/_data/site.yaml
//!       - name: site
//! ```
//!
//! An existing checkout is pulled, a missing one is cloned from `git_url`.
//! With fetching disabled, whatever is already on disk is used and missing
//! data files are skipped with a warning.

use crate::context::BuildContext;
use crate::data::{self, RepoPlacement};
use crate::descriptor::{DescriptorEntry, RepoDescriptor};
use crate::types::{RepoKind, RepoRecord};
use crate::vcs::{Vcs, VcsError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubrepoError {
    #[error("Git error for repo '{name}': {source}")]
    Vcs {
        name: String,
        #[source]
        source: VcsError,
    },
    #[error("Repo '{0}' is not checked out and has no git_url to clone from")]
    MissingGitUrl(String),
    #[error("Data file for repo '{0}' not found at {1}")]
    MissingDataFile(String, PathBuf),
    #[error("Data error: {0}")]
    Data(#[from] data::DataError),
}

/// What happened to one repo during the fetch stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Cloned,
    Pulled,
    /// Fetching disabled; used the checkout on disk as-is.
    Skipped,
}

/// One fetched repo, for reporting.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub name: String,
    pub kind: RepoKind,
    pub dir: PathBuf,
    pub outcome: FetchOutcome,
    /// Variable keys contributed by the repo's data file.
    pub keys: Vec<String>,
}

/// Fetch every repo of `descriptor` and merge their data into `ctx`.
///
/// Pass `vcs: None` to work offline.
pub fn fetch_subrepos(
    ctx: &mut BuildContext,
    descriptor: &RepoDescriptor,
    vcs: Option<&dyn Vcs>,
) -> Result<Vec<FetchReport>, SubrepoError> {
    let mut reports = Vec::new();
    walk(ctx, descriptor, vcs, &[], &mut reports)?;
    Ok(reports)
}

fn walk(
    ctx: &mut BuildContext,
    level: &RepoDescriptor,
    vcs: Option<&dyn Vcs>,
    segments: &[String],
    reports: &mut Vec<FetchReport>,
) -> Result<(), SubrepoError> {
    for entry in &level.entries {
        match entry {
            DescriptorEntry::Repos(kind, records) => {
                if *kind == RepoKind::Internal {
                    ctx.internal_subdoc = true;
                }
                for record in records {
                    reports.push(fetch_one(ctx, *kind, record, vcs, segments)?);
                }
            }
            DescriptorEntry::Segment(name, child) => {
                let mut nested = segments.to_vec();
                nested.push(name.clone());
                walk(ctx, child, vcs, &nested, reports)?;
            }
        }
    }
    Ok(())
}

fn fetch_one(
    ctx: &mut BuildContext,
    kind: RepoKind,
    record: &RepoRecord,
    vcs: Option<&dyn Vcs>,
    segments: &[String],
) -> Result<FetchReport, SubrepoError> {
    let mut dir = ctx.project_root.clone();
    dir.extend(segments);
    dir.push(&record.name);

    let outcome = match vcs {
        None => FetchOutcome::Skipped,
        Some(vcs) if dir.is_dir() => {
            tracing::info!("Pulling repo {}", record.name);
            vcs.pull(&dir).map_err(|source| SubrepoError::Vcs {
                name: record.name.clone(),
                source,
            })?;
            FetchOutcome::Pulled
        }
        Some(vcs) => {
            let url = record
                .git_url
                .as_deref()
                .ok_or_else(|| SubrepoError::MissingGitUrl(record.name.clone()))?;
            tracing::info!("Cloning repo {}", record.name);
            vcs.clone_repo(url, &dir).map_err(|source| SubrepoError::Vcs {
                name: record.name.clone(),
                source,
            })?;
            FetchOutcome::Cloned
        }
    };

    let mut site_dir = dir.clone();
    if let Some(subpath) = &record.subpath {
        site_dir.push(subpath);
    }
    let data_file = site_dir
        .join(&ctx.config.data_dir)
        .join(format!("{}.yaml", record.name));

    let mut report = FetchReport {
        name: record.name.clone(),
        kind,
        dir,
        outcome,
        keys: Vec::new(),
    };

    if !data_file.is_file() {
        if outcome == FetchOutcome::Skipped {
            tracing::warn!(
                "No data file for repo {} at {}, skipping",
                record.name,
                data_file.display()
            );
            return Ok(report);
        }
        return Err(SubrepoError::MissingDataFile(record.name.clone(), data_file));
    }

    let logo_prefix = match kind {
        RepoKind::External => record.online_url.clone().unwrap_or_default(),
        RepoKind::Internal => String::new(),
    };
    let parent = segments.join("/");
    let logo_dir = ctx.config.logo_dir.clone();

    for (key, mut value) in data::load_file(&data_file)? {
        if let Some(name) = key.as_str() {
            let src_prefix = data::join_url(&[&parent, name]);
            let placement = RepoPlacement {
                logo_prefix: &logo_prefix,
                src_prefix: &src_prefix,
                logo_dir: &logo_dir,
            };
            for command in data::apply_repo_defaults(&mut value, name, &placement) {
                if !ctx.conf.append_python_setup_command(&command) {
                    tracing::debug!("mkdocstrings not configured, dropping `{command}`");
                }
            }
            report.keys.push(name.to_string());
        }
        ctx.variables.insert(key, value);
    }

    Ok(report)
}
