use clap::{Parser, Subcommand};
use monodocs::config::{self, ToolConfig};
use monodocs::context::BuildContext;
use monodocs::pipeline::{self, BuildOptions};
use monodocs::vcs::{GitCli, Vcs};
use monodocs::{output, versions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "MONODOCS_LOG";

fn version_string() -> &'static str {
    let on_tag = env!("MONODOCS_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("MONODOCS_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "monodocs")]
#[command(about = "Resolve an mkdocs project that aggregates sub-repository docs")]
#[command(long_about = "\
Resolve an mkdocs project that aggregates sub-repository docs

Reads mkdocs.yml and the variable files in docs/_data/, fetches the
sub-repositories declared in the `subrepo` variable, fills in site metadata
and splices the sub-repos into the navigation. The result is written to
mkdocs.resolved.yml for mkdocs to build.

Project structure:

  project/
  ├── monodocs.toml                # Tool config (optional)
  ├── mkdocs.yml                   # Site config, explicit values always win
  └── docs/
      ├── _data/
      │   ├── vars.yaml            # Site-wide variables (site_base_url, git_platform)
      │   ├── subrepo.yaml         # Sub-repo descriptor
      │   └── <slug>.yaml          # This repo's entry (name, desc, logo, ...)
      └── versions.json            # Written when version.provider is mike

Sub-repo descriptor:

  subrepo:
    libs:                          # Directory segment: sub-repos live in libs/
      nav_entry: Libraries         # Menu title for this level
      internal:                    # Spliced with !include <dir>/mkdocs.yml
        - name: core
          nav_entry: Core
          git_url: https://git.example.com/core.git
      external:                    # Linked by URL
        - name: site
          online_url: https://site.example.com

Run 'monodocs gen-config' to generate a documented monodocs.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory (where mkdocs.yml lives)
    #[arg(long, default_value = ".", global = true)]
    project_dir: PathBuf,

    /// Log debug output (overridden by MONODOCS_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline and write the resolved mkdocs config
    Build {
        /// Use sub-repo checkouts as they are, without cloning or pulling
        #[arg(long)]
        no_fetch: bool,
        /// Write the resolved config here instead of the configured output_file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the navigation tree with sub-repos spliced in
    Nav,
    /// Print the version manifest computed from release tags
    Versions {
        /// Also write it to the configured versions_file
        #[arg(long)]
        write: bool,
    },
    /// Print a variable by dotted path (e.g. git_platform.url)
    Get { path: String },
    /// Validate the project without fetching or writing anything
    Check,
    /// Print a stock monodocs.toml with all options documented
    GenConfig,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build { no_fetch, output: out_file } => {
            let (root, tool_config, git) = open_project(&cli.project_dir)?;
            println!("==> Building {}", root.display());
            let options = BuildOptions {
                fetch: tool_config.fetch.enabled && !no_fetch,
                ..BuildOptions::default()
            };
            let (_, report, written) =
                pipeline::build(&root, tool_config, &git, &options, out_file.as_deref())?;
            output::print_build_report(&report, &root);
            println!("==> Build complete: {}", written.display());
        }
        Command::Nav => {
            let (root, tool_config, _) = open_project(&cli.project_dir)?;
            let mut ctx = BuildContext::load(&root, tool_config)?;
            if let Some(descriptor) = pipeline::load_descriptor(&ctx)? {
                pipeline::splice_nav(&mut ctx, &descriptor)?;
            }
            output::print_nav(&ctx.navigation);
        }
        Command::Versions { write } => {
            let (root, tool_config, git) = open_project(&cli.project_dir)?;
            let entries = versions::build_manifest(&git.tags()?);
            output::print_versions(&entries);
            if write {
                let path = root.join(&tool_config.versions_file);
                versions::write_manifest(&path, &entries)?;
                println!("==> Wrote {}", path.display());
            }
        }
        Command::Get { path } => {
            let (root, tool_config, _) = open_project(&cli.project_dir)?;
            let ctx = BuildContext::load(&root, tool_config)?;
            let value = ctx
                .variable(&path)
                .ok_or_else(|| format!("Variable '{path}' is not defined"))?;
            match value.as_str() {
                Some(text) => println!("{text}"),
                None => print!("{}", serde_yaml::to_string(value)?),
            }
        }
        Command::Check => {
            let (root, tool_config, git) = open_project(&cli.project_dir)?;
            println!("==> Checking {}", root.display());
            let mut ctx = BuildContext::load(&root, tool_config)?;
            let options = BuildOptions {
                fetch: false,
                write_versions: false,
                ..BuildOptions::default()
            };
            let report = pipeline::run(&mut ctx, &git, &options)?;
            output::print_build_report(&report, &root);
            println!("==> Project is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve the project directory, load its tool config and open its git repo.
///
/// The directory is made absolute: include paths in the nav are absolute,
/// so a relative `--project-dir` would leak the caller's working directory
/// into them.
fn open_project(dir: &Path) -> Result<(PathBuf, ToolConfig, GitCli), Box<dyn std::error::Error>> {
    let root = dir.canonicalize()?;
    let tool_config = config::load_config(&root)?;
    let git = GitCli::new(&root, tool_config.fetch.remote.clone());
    Ok((root, tool_config, git))
}
