//! Shared test utilities for the monodocs test suite.
//!
//! Provides record and descriptor constructors, navigation tree assertions,
//! a throwaway project builder, and an in-memory [`Vcs`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = TestProject::new()
//!     .mkdocs("site_name: Docs\n")
//!     .data("docs.yaml", "docs:\n  name: Docs\n")
//!     .build();
//! let mut ctx = project.context();
//!
//! let vcs = FakeVcs::default()
//!     .seed("https://git.test/core.git", "docs/_data/core.yaml", "core: {}\n");
//!
//! assert_nav_shape(&ctx.navigation, &[
//!     ("Home", &[]),
//!     ("Libraries", &["Core"]),
//! ]);
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::ToolConfig;
use crate::context::BuildContext;
use crate::descriptor::RepoDescriptor;
use crate::types::{NavNode, NavTree, RepoRecord};
use crate::vcs::{Vcs, VcsError};

// =========================================================================
// Constructors
// =========================================================================

/// A bare repo record, optionally with a leaf title.
pub fn record(name: &str, title: Option<&str>) -> RepoRecord {
    RepoRecord {
        name: name.to_string(),
        nav_entry: title.map(String::from),
        subpath: None,
        git_url: None,
        online_url: None,
    }
}

/// An external repo record published at `url`.
pub fn external(name: &str, title: &str, url: &str) -> RepoRecord {
    RepoRecord {
        online_url: Some(url.to_string()),
        ..record(name, Some(title))
    }
}

/// Parse a descriptor from YAML. Panics on invalid input.
pub fn descriptor(yaml: &str) -> RepoDescriptor {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    RepoDescriptor::from_yaml(&value).unwrap_or_else(|e| panic!("invalid descriptor: {e}\n{yaml}"))
}

// =========================================================================
// Navigation helpers
// =========================================================================

/// Titles of the titled nodes of one level, in order.
pub fn nav_titles(tree: &NavTree) -> Vec<&str> {
    tree.iter().filter_map(NavNode::title).collect()
}

fn find_node<'a>(tree: &'a NavTree, title: &str) -> &'a NavNode {
    tree.iter()
        .find(|n| n.title() == Some(title))
        .unwrap_or_else(|| {
            let titles = nav_titles(tree);
            panic!("nav item '{title}' not found. Available: {titles:?}")
        })
}

/// Assert that the top two levels of a tree match an expected shape.
///
/// Each entry is `(title, children)`. Use `&[]` for leaves.
pub fn assert_nav_shape(tree: &NavTree, expected: &[(&str, &[&str])]) {
    let expected_titles: Vec<&str> = expected.iter().map(|(t, _)| *t).collect();
    assert_eq!(nav_titles(tree), expected_titles, "nav top-level titles mismatch");

    for (title, children) in expected {
        let actual_children = match find_node(tree, title) {
            NavNode::Branch { children, .. } => nav_titles(children),
            _ => Vec::new(),
        };
        assert_eq!(
            actual_children,
            children.to_vec(),
            "nav children of '{title}' mismatch"
        );
    }
}

/// Follow a title path down the tree and return the leaf target. Panics on miss.
pub fn find_leaf(tree: &NavTree, path: &[&str]) -> String {
    let (last, branches) = path.split_last().expect("empty nav path");
    let mut level = tree;
    for title in branches {
        match find_node(level, title) {
            NavNode::Branch { children, .. } => level = children,
            other => panic!("nav item '{title}' is not a branch: {other:?}"),
        }
    }
    match find_node(level, last) {
        NavNode::Leaf { target, .. } => target.clone(),
        other => panic!("nav item '{last}' is not a leaf: {other:?}"),
    }
}

// =========================================================================
// Throwaway projects
// =========================================================================

/// Builder for a project directory in a temp dir.
pub struct TestProject {
    mkdocs: String,
    files: Vec<(PathBuf, String)>,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            mkdocs: "site_name: x\n".to_string(),
            files: Vec::new(),
        }
    }

    /// Contents of `mkdocs.yml`.
    pub fn mkdocs(mut self, content: &str) -> Self {
        self.mkdocs = content.to_string();
        self
    }

    /// Any file, relative to the project root.
    pub fn file(mut self, path: &str, content: &str) -> Self {
        self.files.push((PathBuf::from(path), content.to_string()));
        self
    }

    /// A file in the default data directory.
    pub fn data(self, name: &str, content: &str) -> Self {
        let path = format!("{}/{name}", ToolConfig::default().data_dir);
        self.file(&path, content)
    }

    pub fn build(self) -> BuiltProject {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("mkdocs.yml"), &self.mkdocs).unwrap();
        for (path, content) in &self.files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        BuiltProject { dir }
    }
}

/// A project on disk. The directory is removed on drop.
pub struct BuiltProject {
    dir: TempDir,
}

impl BuiltProject {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Load a fresh context with the default tool config.
    pub fn context(&self) -> BuildContext {
        BuildContext::load(self.root(), ToolConfig::default()).unwrap()
    }
}

// =========================================================================
// In-memory version control
// =========================================================================

/// [`Vcs`] that records calls and materializes seeded files on clone.
#[derive(Default)]
pub struct FakeVcs {
    origin: Option<String>,
    first_commit: Option<i64>,
    tags: Vec<String>,
    seeds: Vec<(String, PathBuf, String)>,
    fail: bool,
    cloned: RefCell<Vec<String>>,
    pulled: RefCell<Vec<String>>,
}

impl FakeVcs {
    /// Write `content` to `path` inside every clone of `url`.
    pub fn seed(mut self, url: &str, path: &str, content: &str) -> Self {
        self.seeds
            .push((url.to_string(), PathBuf::from(path), content.to_string()));
        self
    }

    pub fn with_origin(mut self, url: &str) -> Self {
        self.origin = Some(url.to_string());
        self
    }

    pub fn with_first_commit(mut self, timestamp: i64) -> Self {
        self.first_commit = Some(timestamp);
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Make every clone and pull fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// URLs cloned so far, in order.
    pub fn cloned(&self) -> Vec<String> {
        self.cloned.borrow().clone()
    }

    /// Directories pulled so far, in order.
    pub fn pulled(&self) -> Vec<String> {
        self.pulled.borrow().clone()
    }

    fn check(&self, command: &str) -> Result<(), VcsError> {
        if self.fail {
            return Err(VcsError::Failed {
                command: command.to_string(),
                stderr: "fatal: simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Vcs for FakeVcs {
    fn origin_url(&self) -> Option<String> {
        self.origin.clone()
    }

    fn first_commit_time(&self) -> Option<i64> {
        self.first_commit
    }

    fn tags(&self) -> Result<Vec<String>, VcsError> {
        Ok(self.tags.clone())
    }

    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), VcsError> {
        self.check("clone")?;
        fs::create_dir_all(dest)?;
        for (seed_url, path, content) in &self.seeds {
            if seed_url == url {
                let full = dest.join(path);
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(full, content)?;
            }
        }
        self.cloned.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn pull(&self, dest: &Path) -> Result<(), VcsError> {
        self.check("pull")?;
        self.pulled
            .borrow_mut()
            .push(dest.display().to_string());
        Ok(())
    }
}
