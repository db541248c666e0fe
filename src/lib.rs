//! # Monodocs
//!
//! A build-time preprocessor for mkdocs documentation projects that pull in
//! the documentation of companion repositories. It reads `mkdocs.yml` and
//! the data files under `docs/_data/`, fills in site metadata, fetches
//! sub-repositories, splices them into the navigation and writes a resolved
//! `mkdocs.yml` for mkdocs to build.
//!
//! # Architecture: One Context, Six Stages
//!
//! ```text
//! 1. Load      docs/_data/*.yaml    → variables
//! 2. Fetch     variables.subrepo    → sub-repo checkouts + their variables
//! 3. Metadata  variables            → site_name, site_url, copyright, theme, ...
//! 4. Splice    variables.subrepo    → nav tree
//! 5. Versions  git tags             → docs/versions.json
//! 6. Write     BuildContext         → mkdocs.resolved.yml
//! ```
//!
//! Every stage reads and writes one [`context::BuildContext`], passed by
//! reference. There is no global state; a run starts from files on disk and
//! ends with files on disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`nav`] | Stage 4: the navigation tree merger (branch resolution, leaf installers, descriptor walk) |
//! | [`descriptor`] | Typed form of the `subrepo` variable, in declaration order |
//! | [`subrepo`] | Stage 2: clone or pull sub-repos, merge their data files |
//! | [`site`] | Stage 3: repo slug and metadata rules for `mkdocs.yml` |
//! | [`versions`] | Stage 5: `mike` version manifest from release tags |
//! | [`pipeline`] | Runs the stages in order, aggregates their errors |
//! | [`context`] | Build state: site config, nav tree, variables |
//! | [`data`] | Stage 1: data directory loading and repo defaults |
//! | [`mkdocs`] | Typed accessors over the `mkdocs.yml` mapping: unset checks, theme, plugins |
//! | [`vcs`] | The git collaborator trait and its `git` CLI implementation |
//! | [`config`] | Layered `monodocs.toml` loading and validation |
//! | [`types`] | Shared types: `NavNode`, `RepoRecord`, `RepoKind` |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Typed Nav Tree
//!
//! mkdocs stores the navigation as a list of single-key mappings. Splicing
//! works on [`types::NavNode`] instead, so "find or create the branch titled
//! X" is a match on an enum rather than a probe into arbitrary YAML. Untitled
//! page references survive the round trip unchanged.
//!
//! ## Two Paths Through the Descriptor
//!
//! Each descriptor level contributes to two independent paths: its
//! `nav_entry` to the menu path, its key to the directory path. Both are
//! passed down the recursion by value, so sibling levels never see each
//! other's segments.
//!
//! ## Explicit Values Win
//!
//! Metadata rules only fill keys `mkdocs.yml` leaves unset (missing, null,
//! blank, empty, or `false`). Anything written by hand is kept.
//!
//! ## Git as a Collaborator
//!
//! All git access goes through [`vcs::Vcs`]. The shipped implementation
//! runs the `git` binary; tests use an in-memory fake.

pub mod config;
pub mod context;
pub mod data;
pub mod descriptor;
pub mod mkdocs;
pub mod nav;
pub mod output;
pub mod pipeline;
pub mod site;
pub mod subrepo;
pub mod types;
pub mod vcs;
pub mod versions;

#[cfg(test)]
pub(crate) mod test_helpers;
