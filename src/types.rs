//! Shared types used across all pipeline stages.
//!
//! The navigation types mirror the shape of the `nav:` key in `mkdocs.yml`:
//! an ordered list whose items are single-entry mappings from a title to
//! either a link (leaf) or another list (branch). Repo records describe one
//! sub-repository as declared in `docs/_data/subrepo.yaml`.

use serde::{Deserialize, Serialize};

/// Ordered navigation tree. Order is the displayed menu order.
pub type NavTree = Vec<NavNode>;

/// One entry of a navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavNode {
    /// Untitled page reference (`- index.md`), kept so round trips are lossless.
    Page(String),
    /// `{title: target}` where the target is a page path, URL or `!include` directive.
    Leaf { title: String, target: String },
    /// `{title: [...]}`, a submenu.
    Branch { title: String, children: NavTree },
}

impl NavNode {
    pub fn leaf(title: impl Into<String>, target: impl Into<String>) -> Self {
        NavNode::Leaf {
            title: title.into(),
            target: target.into(),
        }
    }

    pub fn branch(title: impl Into<String>, children: NavTree) -> Self {
        NavNode::Branch {
            title: title.into(),
            children,
        }
    }

    /// Title of the node, `None` for untitled pages.
    pub fn title(&self) -> Option<&str> {
        match self {
            NavNode::Page(_) => None,
            NavNode::Leaf { title, .. } | NavNode::Branch { title, .. } => Some(title),
        }
    }
}

/// Which way a sub-repository is spliced into the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoKind {
    /// Built from fetched source, spliced with an `!include` directive.
    Internal,
    /// Already published elsewhere, linked by URL.
    External,
}

impl RepoKind {
    /// Reserved descriptor key for this kind.
    pub fn key(self) -> &'static str {
        match self {
            RepoKind::Internal => "internal",
            RepoKind::External => "external",
        }
    }
}

/// One sub-repository entry from a repo descriptor list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRecord {
    /// Directory name of the repository and key of its data file.
    pub name: String,
    /// Title of the nav leaf. Falls back to `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_entry: Option<String>,
    /// Location of the mkdocs project inside the repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_url: Option<String>,
}

impl RepoRecord {
    pub fn title(&self) -> &str {
        self.nav_entry.as_deref().unwrap_or(&self.name)
    }
}
