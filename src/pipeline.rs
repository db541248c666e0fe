//! The build pipeline.
//!
//! ```text
//! 1. Load      docs/_data/*.yaml    → variables        (BuildContext::load)
//! 2. Fetch     variables.subrepo    → sub-repo checkouts + their variables
//! 3. Metadata  variables            → site_name, site_url, copyright, theme, ...
//! 4. Splice    variables.subrepo    → nav tree
//! 5. Versions  git tags             → docs/versions.json (mike provider only)
//! 6. Write     resolved mkdocs.yml
//! ```
//!
//! [`run`] performs stages 2–5 on a loaded context; [`build`] wraps the whole
//! thing including loading and writing. Stages never run concurrently and
//! the first error aborts the run.

use crate::config::{ConfigError, ToolConfig};
use crate::context::{BuildContext, ContextError};
use crate::descriptor::{DescriptorError, RepoDescriptor};
use crate::nav::{self, NavError, SpliceLayout};
use crate::site::{self, SiteError, SiteInputs};
use crate::subrepo::{self, FetchReport, SubrepoError};
use crate::vcs::{Vcs, VcsError};
use crate::versions::{self, VersionEntry, VersionError};
use chrono::Datelike;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Variable holding the repo descriptor.
pub const DESCRIPTOR_VARIABLE: &str = "subrepo";

/// Plugin that resolves `!include` nav entries.
pub const MONOREPO_PLUGIN: &str = "monorepo";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Context(#[from] ContextError),
    #[error("Invalid subrepo descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
    #[error("{0}")]
    Subrepo(#[from] SubrepoError),
    #[error("{0}")]
    Site(#[from] SiteError),
    #[error("Nav error: {0}")]
    Nav(#[from] NavError),
    #[error("Git error: {0}")]
    Vcs(#[from] VcsError),
    #[error("Version manifest error: {0}")]
    Version(#[from] VersionError),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Clone or pull sub-repos. When off, checkouts on disk are used as-is.
    pub fetch: bool,
    /// Write the version manifest to disk when the mike provider is selected.
    pub write_versions: bool,
    /// Upper year of the copyright line.
    pub current_year: i32,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            fetch: true,
            write_versions: true,
            current_year: chrono::Local::now().year(),
        }
    }
}

/// What a run did, for reporting.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub slug: String,
    pub fetched: Vec<FetchReport>,
    pub leaves_added: usize,
    /// `None` unless the mike provider is selected.
    pub versions: Option<Vec<VersionEntry>>,
    /// Path the version manifest was written to.
    pub versions_file: Option<PathBuf>,
    pub monorepo_removed: bool,
}

/// Parse the `subrepo` variable. Missing or null means no sub-repos.
pub fn load_descriptor(ctx: &BuildContext) -> Result<Option<RepoDescriptor>, DescriptorError> {
    match ctx.variables.get(DESCRIPTOR_VARIABLE) {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(value) => RepoDescriptor::from_yaml(value).map(Some),
    }
}

/// Splice `descriptor` into the context's nav tree.
pub fn splice_nav(ctx: &mut BuildContext, descriptor: &RepoDescriptor) -> Result<usize, NavError> {
    let layout = SpliceLayout {
        project_root: &ctx.project_root,
        include_file: &ctx.config.include_file,
    };
    nav::update_nav(&mut ctx.navigation, &layout, descriptor)
}

/// Run the fetch, metadata, splice and version stages on a loaded context.
pub fn run(ctx: &mut BuildContext, vcs: &dyn Vcs, options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let descriptor = load_descriptor(ctx)?;
    let mut report = BuildReport::default();

    if let Some(descriptor) = &descriptor {
        tracing::info!("Descriptor lists {} sub-repos", descriptor.record_count());
        if descriptor.has_internal() && !ctx.conf.has_plugin(MONOREPO_PLUGIN) {
            tracing::warn!("Internal sub-repos are spliced with !include, which needs the {MONOREPO_PLUGIN} plugin");
        }
        let fetcher = options.fetch.then_some(vcs);
        report.fetched = subrepo::fetch_subrepos(ctx, descriptor, fetcher)?;
    }

    let origin = vcs.origin_url();
    report.slug = site::repo_slug(origin.as_deref(), &ctx.project_root);
    tracing::debug!("Repo slug: {}", report.slug);
    site::require_repo_data(&ctx.variables, &report.slug, &ctx.config.data_dir)?;

    let inputs = SiteInputs {
        slug: &report.slug,
        first_commit: vcs.first_commit_time(),
        current_year: options.current_year,
        logo_dir: &ctx.config.logo_dir,
    };
    site::apply_site_metadata(&mut ctx.conf, &ctx.variables, &inputs)?;

    if !ctx.internal_subdoc {
        report.monorepo_removed = ctx.conf.remove_plugin(MONOREPO_PLUGIN);
        if report.monorepo_removed {
            tracing::info!("No internal sub-repo, removed the {MONOREPO_PLUGIN} plugin");
        }
    }

    if let Some(descriptor) = &descriptor {
        report.leaves_added = splice_nav(ctx, descriptor)?;
    }

    if versions::mike_enabled(&ctx.variables) {
        let entries = versions::build_manifest(&vcs.tags()?);
        if options.write_versions {
            let path = ctx.project_root.join(&ctx.config.versions_file);
            versions::write_manifest(&path, &entries)?;
            tracing::info!("Wrote {} versions to {}", entries.len(), path.display());
            report.versions_file = Some(path);
        }
        report.versions = Some(entries);
    }

    Ok(report)
}

/// Load a project, run the pipeline and write the resolved config.
///
/// `output` overrides the configured output file.
pub fn build(
    project_root: &Path,
    config: ToolConfig,
    vcs: &dyn Vcs,
    options: &BuildOptions,
    output: Option<&Path>,
) -> Result<(BuildContext, BuildReport, PathBuf), BuildError> {
    let mut ctx = BuildContext::load(project_root, config)?;
    let report = run(&mut ctx, vcs, options)?;
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => ctx.project_root.join(&ctx.config.output_file),
    };
    ctx.write(&path)?;
    tracing::info!("Wrote {}", path.display());
    Ok((ctx, report, path))
}
