//! Version-control collaborator.
//!
//! The pipeline needs four things from git: the origin URL (for the repo
//! slug), the first commit time (for the copyright line), the tag list (for
//! the version manifest), and a way to clone or update sub-repositories.
//! [`Vcs`] is that contract; [`GitCli`] implements it by running the `git`
//! binary, the same way `build.rs` reads the build hash.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("`git {command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
}

pub trait Vcs {
    /// URL of the configured remote of the project repository, if any.
    fn origin_url(&self) -> Option<String>;

    /// Unix timestamp of the first commit of the project repository.
    fn first_commit_time(&self) -> Option<i64>;

    /// All tag names of the project repository.
    fn tags(&self) -> Result<Vec<String>, VcsError>;

    /// Clone `url` into `dest`.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError>;

    /// Update an existing checkout at `dest` from its remote.
    fn pull(&self, dest: &Path) -> Result<(), VcsError>;
}

/// [`Vcs`] backed by the `git` command-line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            remote: remote.into(),
        }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
        let output = Command::new("git").arg("-C").arg(dir).args(args).output()?;
        if !output.status.success() {
            return Err(VcsError::Failed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitCli {
    fn origin_url(&self) -> Option<String> {
        self.run(&self.root, &["remote", "get-url", &self.remote])
            .ok()
            .filter(|url| !url.is_empty())
    }

    fn first_commit_time(&self) -> Option<i64> {
        let log = self
            .run(&self.root, &["log", "--reverse", "--format=%ct"])
            .ok()?;
        log.lines().next()?.trim().parse().ok()
    }

    fn tags(&self) -> Result<Vec<String>, VcsError> {
        let listing = self.run(&self.root, &["tag", "--list"])?;
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect())
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        // Run from the parent so relative destinations resolve the same way
        let parent = dest.parent().unwrap_or(self.root.as_path());
        std::fs::create_dir_all(parent)?;
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.run(parent, &["clone", url, &name]).map(|_| ())
    }

    fn pull(&self, dest: &Path) -> Result<(), VcsError> {
        self.run(dest, &["pull", &self.remote]).map(|_| ())
    }
}
