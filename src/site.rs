//! Site metadata resolution.
//!
//! Fills in the top-level keys of `mkdocs.yml` from the variables, but only
//! where `mkdocs.yml` leaves them unset. Anything written explicitly in
//! `mkdocs.yml` wins.
//!
//! The current repository is identified by its *slug*: the last component
//! of the remote URL without `.git`, dots replaced by underscores
//! (`https://git.test/ns/my.docs.git` → `my_docs`). Without a remote the
//! project directory name is used. The slug must name a variable holding
//! the repo entry (usually `docs/_data/<slug>.yaml`).
//!
//! ## Resolution order (first available wins)
//!
//! | Key | Sources |
//! |-----|---------|
//! | `site_name` | `site_name` → `<slug>.name` |
//! | `site_desc` | `site_desc` → `<slug>.desc` |
//! | `site_url` | `site_url` → `site_base_url` + `<slug>.url_slug_with_namespace` |
//! | `copyright` | `Copyright &copy; <first year> - <this year> <copyright>` |
//! | `repo_name` | `<slug>.name`, or `git_platform.name` when it reads `!!git_platform` |
//! | `repo_url` | `repo_url` → `git_platform.url` + `<slug>.git_slug_with_namespace` |
//! | `theme.*` | `theme.*` variables, then logo/icon/favicon defaults |

use crate::data::{Variables, join_url};
use crate::mkdocs::{MkdocsConfig, is_unset, lookup, lookup_str};
use chrono::{DateTime, Datelike};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;

/// Placeholder in a repo entry's `name` that defers to the git platform's name.
pub const GIT_PLATFORM_PLACEHOLDER: &str = "!!git_platform";

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(
        "Dictionary '{slug}' is not defined. Copy {data_dir}/templates/repo.tpl.yaml to {data_dir}/{slug}.yaml and set up the '{slug}' dictionary in it"
    )]
    MissingRepoData { slug: String, data_dir: String },
    #[error("site_name is not set in mkdocs.yml and neither 'site_name' nor '{0}.name' is defined")]
    MissingSiteName(String),
}

/// Derive the repo slug from the remote URL, or the project directory name.
pub fn repo_slug(origin_url: Option<&str>, project_root: &Path) -> String {
    match origin_url {
        Some(url) if !url.trim().is_empty() => {
            let last = url.trim().trim_end_matches('/').rsplit('/').next().unwrap_or(url);
            // scp-style remotes without a slash: git@host:repo.git
            let last = last.rsplit(':').next().unwrap_or(last);
            let stem = last.split(".git").next().unwrap_or(last);
            stem.replace('.', "_")
        }
        _ => project_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// Fail unless the variables hold an entry for `slug`.
pub fn require_repo_data(variables: &Variables, slug: &str, data_dir: &str) -> Result<(), SiteError> {
    if variables.contains_key(slug) {
        Ok(())
    } else {
        Err(SiteError::MissingRepoData {
            slug: slug.to_string(),
            data_dir: data_dir.to_string(),
        })
    }
}

/// Everything the metadata pass needs besides the config and variables.
#[derive(Debug, Clone)]
pub struct SiteInputs<'a> {
    pub slug: &'a str,
    /// Unix time of the first commit, when known.
    pub first_commit: Option<i64>,
    pub current_year: i32,
    pub logo_dir: &'a str,
}

/// Apply every metadata rule in order.
pub fn apply_site_metadata(
    conf: &mut MkdocsConfig,
    variables: &Variables,
    inputs: &SiteInputs<'_>,
) -> Result<(), SiteError> {
    let slug = inputs.slug;
    set_site_name(conf, variables, slug)?;
    set_site_desc(conf, variables, slug);
    set_site_url(conf, variables, slug);
    set_copyright(conf, variables, inputs.first_commit, inputs.current_year);
    set_repo_name(conf, variables, slug);
    set_repo_url(conf, variables, slug);
    update_theme(conf, variables, slug, inputs.logo_dir);
    Ok(())
}

fn repo_field<'a>(variables: &'a Variables, slug: &str, field: &str) -> Option<&'a str> {
    variables
        .get(slug)
        .and_then(Value::as_mapping)
        .and_then(|repo| repo.get(field))
        .and_then(Value::as_str)
}

pub fn set_site_name(conf: &mut MkdocsConfig, variables: &Variables, slug: &str) -> Result<(), SiteError> {
    if !conf.is_unset("site_name") {
        return Ok(());
    }
    let name = lookup_str(variables, "site_name")
        .or_else(|| repo_field(variables, slug, "name"))
        .ok_or_else(|| SiteError::MissingSiteName(slug.to_string()))?;
    conf.set("site_name", name);
    Ok(())
}

pub fn set_site_desc(conf: &mut MkdocsConfig, variables: &Variables, slug: &str) {
    if !conf.is_unset("site_desc") {
        return;
    }
    if let Some(desc) =
        lookup_str(variables, "site_desc").or_else(|| repo_field(variables, slug, "desc"))
    {
        conf.set("site_desc", desc);
    }
}

pub fn set_site_url(conf: &mut MkdocsConfig, variables: &Variables, slug: &str) {
    if !conf.is_unset("site_url") {
        return;
    }
    if let Some(url) = lookup_str(variables, "site_url") {
        conf.set("site_url", url);
    } else if let Some(base) = lookup_str(variables, "site_base_url") {
        let suffix = repo_field(variables, slug, "url_slug_with_namespace").unwrap_or_default();
        conf.set("site_url", format!("{base}{suffix}"));
    }
}

/// Year of a unix timestamp, in UTC.
fn year_of(timestamp: i64) -> Option<i32> {
    DateTime::from_timestamp(timestamp, 0).map(|d| d.year())
}

pub fn set_copyright(
    conf: &mut MkdocsConfig,
    variables: &Variables,
    first_commit: Option<i64>,
    current_year: i32,
) {
    if !conf.is_unset("copyright") {
        return;
    }
    let Some(holder) = lookup_str(variables, "copyright") else {
        return;
    };
    let first_year = first_commit.and_then(year_of).unwrap_or(current_year);
    conf.set(
        "copyright",
        format!("Copyright &copy; {first_year} - {current_year} {holder}"),
    );
}

pub fn set_repo_name(conf: &mut MkdocsConfig, variables: &Variables, slug: &str) {
    if !conf.is_unset("repo_name") {
        return;
    }
    match repo_field(variables, slug, "name") {
        Some(GIT_PLATFORM_PLACEHOLDER) => {
            if let Some(platform) = lookup_str(variables, "git_platform.name") {
                conf.set("repo_name", platform);
            }
        }
        Some(name) => conf.set("repo_name", name),
        None => {}
    }
}

pub fn set_repo_url(conf: &mut MkdocsConfig, variables: &Variables, slug: &str) {
    if !conf.is_unset("repo_url") {
        return;
    }
    if let Some(url) = lookup_str(variables, "repo_url") {
        conf.set("repo_url", url);
    } else if conf.contains("repo_url") {
        // Present but empty in mkdocs.yml: build it from the platform
        let base = lookup_str(variables, "git_platform.url");
        let path = repo_field(variables, slug, "git_slug_with_namespace");
        if let (Some(base), Some(path)) = (base, path) {
            conf.set("repo_url", format!("{base}{path}"));
        }
    }
}

pub fn update_theme(conf: &mut MkdocsConfig, variables: &Variables, slug: &str, logo_dir: &str) {
    let default_logo = join_url(&[logo_dir, &format!("{slug}_logo.png")]);
    let repo_logo = repo_field(variables, slug, "logo").map(String::from);
    let repo_favicon = repo_field(variables, slug, "favicon").map(String::from);
    let platform_icon = lookup(variables, "git_platform.icon").cloned();
    let overrides = lookup(variables, "theme").and_then(Value::as_mapping).cloned();

    let theme = conf.theme_mut();

    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            theme.insert(key, value);
        }
    }

    if is_unset(theme.get("logo")) {
        let logo = repo_logo.clone().unwrap_or_else(|| default_logo.clone());
        theme.insert(Value::String("logo".into()), Value::String(logo));
    }

    if is_unset(theme.get("icon")) {
        if let Some(icon) = platform_icon {
            let mut icons = Mapping::new();
            icons.insert(Value::String("repo".into()), icon);
            theme.insert(Value::String("icon".into()), Value::Mapping(icons));
        }
    }

    if is_unset(theme.get("favicon")) {
        let favicon = repo_favicon.or(repo_logo).unwrap_or(default_logo);
        theme.insert(Value::String("favicon".into()), Value::String(favicon));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conf(yaml: &str) -> MkdocsConfig {
        MkdocsConfig::new(serde_yaml::from_str(yaml).unwrap())
    }

    fn vars(yaml: &str) -> Variables {
        serde_yaml::from_str(yaml).unwrap()
    }

    const REPO_VARS: &str = r#"
my_docs:
  name: My Docs
  desc: Documentation of everything
  url_slug_with_namespace: team/my-docs
  git_slug_with_namespace: team/my-docs
  logo: assets/img/meta/my_docs_logo.png
git_platform:
  name: GitLab
  url: https://gitlab.test/
  icon: fontawesome/brands/gitlab
"#;

    // =========================================================================
    // repo_slug
    // =========================================================================

    #[test]
    fn slug_from_https_remote() {
        assert_eq!(
            repo_slug(Some("https://git.test/ns/my.docs.git"), Path::new("/x")),
            "my_docs"
        );
    }

    #[test]
    fn slug_from_scp_remote() {
        assert_eq!(repo_slug(Some("git@git.test:ns/tools.git"), Path::new("/x")), "tools");
        assert_eq!(repo_slug(Some("git@git.test:tools.git"), Path::new("/x")), "tools");
    }

    #[test]
    fn slug_from_remote_without_suffix() {
        assert_eq!(repo_slug(Some("https://git.test/ns/site/"), Path::new("/x")), "site");
    }

    #[test]
    fn slug_falls_back_to_directory() {
        assert_eq!(repo_slug(None, Path::new("/work/handbook")), "handbook");
        assert_eq!(repo_slug(Some(""), Path::new("/work/handbook")), "handbook");
    }

    #[test]
    fn missing_repo_data_mentions_template() {
        let err = require_repo_data(&Variables::new(), "handbook", "docs/_data").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("docs/_data/templates/repo.tpl.yaml"));
        assert!(msg.contains("docs/_data/handbook.yaml"));
    }

    // =========================================================================
    // Individual rules
    // =========================================================================

    #[test]
    fn site_name_from_repo_entry() {
        let mut c = conf("site_name: ''\n");
        set_site_name(&mut c, &vars(REPO_VARS), "my_docs").unwrap();
        assert_eq!(c.get_str("site_name"), Some("My Docs"));
    }

    #[test]
    fn site_name_variable_wins_over_repo_entry() {
        let mut c = conf("{}\n");
        let mut v = vars(REPO_VARS);
        v.insert("site_name".into(), "Override".into());
        set_site_name(&mut c, &v, "my_docs").unwrap();
        assert_eq!(c.get_str("site_name"), Some("Override"));
    }

    #[test]
    fn site_name_in_mkdocs_is_kept() {
        let mut c = conf("site_name: Mine\n");
        set_site_name(&mut c, &vars(REPO_VARS), "my_docs").unwrap();
        assert_eq!(c.get_str("site_name"), Some("Mine"));
    }

    #[test]
    fn site_name_missing_everywhere_is_error() {
        let mut c = conf("{}\n");
        let err = set_site_name(&mut c, &vars("other: {}\n"), "my_docs").unwrap_err();
        assert!(matches!(err, SiteError::MissingSiteName(_)));
    }

    #[test]
    fn site_url_built_from_base() {
        let mut c = conf("{}\n");
        let mut v = vars(REPO_VARS);
        v.insert("site_base_url".into(), "https://docs.test/".into());
        set_site_url(&mut c, &v, "my_docs");
        assert_eq!(c.get_str("site_url"), Some("https://docs.test/team/my-docs"));
    }

    #[test]
    fn site_url_untouched_without_sources() {
        let mut c = conf("{}\n");
        set_site_url(&mut c, &vars(REPO_VARS), "my_docs");
        assert!(!c.contains("site_url"));
    }

    #[test]
    fn site_desc_from_repo_entry() {
        let mut c = conf("{}\n");
        set_site_desc(&mut c, &vars(REPO_VARS), "my_docs");
        assert_eq!(c.get_str("site_desc"), Some("Documentation of everything"));
    }

    #[test]
    fn copyright_uses_first_commit_year() {
        let mut c = conf("{}\n");
        let v = vars("copyright: ACME Corp\n");
        // 2019-06-01T00:00:00Z
        set_copyright(&mut c, &v, Some(1_559_347_200), 2026);
        assert_eq!(c.get_str("copyright"), Some("Copyright &copy; 2019 - 2026 ACME Corp"));
    }

    #[test]
    fn copyright_without_history_uses_current_year() {
        let mut c = conf("{}\n");
        set_copyright(&mut c, &vars("copyright: ACME\n"), None, 2026);
        assert_eq!(c.get_str("copyright"), Some("Copyright &copy; 2026 - 2026 ACME"));
    }

    #[test]
    fn copyright_requires_variable() {
        let mut c = conf("{}\n");
        set_copyright(&mut c, &Variables::new(), None, 2026);
        assert!(!c.contains("copyright"));
    }

    #[test]
    fn repo_name_placeholder_uses_platform() {
        let mut c = conf("{}\n");
        let v = vars("repo:\n  name: '!!git_platform'\ngit_platform:\n  name: GitHub\n");
        set_repo_name(&mut c, &v, "repo");
        assert_eq!(c.get_str("repo_name"), Some("GitHub"));
    }

    #[test]
    fn repo_name_from_entry() {
        let mut c = conf("{}\n");
        set_repo_name(&mut c, &vars(REPO_VARS), "my_docs");
        assert_eq!(c.get_str("repo_name"), Some("My Docs"));
    }

    #[test]
    fn repo_url_variable_wins() {
        let mut c = conf("repo_url: ''\n");
        let mut v = vars(REPO_VARS);
        v.insert("repo_url".into(), "https://elsewhere.test".into());
        set_repo_url(&mut c, &v, "my_docs");
        assert_eq!(c.get_str("repo_url"), Some("https://elsewhere.test"));
    }

    #[test]
    fn repo_url_built_when_key_present_but_empty() {
        let mut c = conf("repo_url:\n");
        set_repo_url(&mut c, &vars(REPO_VARS), "my_docs");
        assert_eq!(c.get_str("repo_url"), Some("https://gitlab.test/team/my-docs"));
    }

    #[test]
    fn repo_url_not_added_when_key_absent() {
        let mut c = conf("{}\n");
        set_repo_url(&mut c, &vars(REPO_VARS), "my_docs");
        assert!(!c.contains("repo_url"));
    }

    // =========================================================================
    // Theme
    // =========================================================================

    #[test]
    fn theme_defaults_filled_in() {
        let mut c = conf("theme:\n  name: material\n");
        update_theme(&mut c, &vars(REPO_VARS), "my_docs", "assets/img/meta");
        let raw = c.raw();
        assert_eq!(lookup_str(raw, "theme.name"), Some("material"));
        assert_eq!(lookup_str(raw, "theme.logo"), Some("assets/img/meta/my_docs_logo.png"));
        assert_eq!(lookup_str(raw, "theme.icon.repo"), Some("fontawesome/brands/gitlab"));
        assert_eq!(lookup_str(raw, "theme.favicon"), Some("assets/img/meta/my_docs_logo.png"));
    }

    #[test]
    fn theme_variables_override_mkdocs() {
        let mut c = conf("theme:\n  name: material\n  language: en\n");
        let mut v = vars(REPO_VARS);
        v.insert("theme".into(), vars("language: fr\nfavicon: fav.ico\n").into());
        update_theme(&mut c, &v, "my_docs", "assets/img/meta");
        assert_eq!(lookup_str(c.raw(), "theme.language"), Some("fr"));
        assert_eq!(lookup_str(c.raw(), "theme.favicon"), Some("fav.ico"));
    }

    #[test]
    fn theme_explicit_values_kept() {
        let mut c = conf("theme:\n  logo: mine.png\n  icon:\n    repo: custom\n");
        update_theme(&mut c, &vars(REPO_VARS), "my_docs", "assets/img/meta");
        assert_eq!(lookup_str(c.raw(), "theme.logo"), Some("mine.png"));
        assert_eq!(lookup_str(c.raw(), "theme.icon.repo"), Some("custom"));
    }

    #[test]
    fn theme_favicon_prefers_repo_favicon() {
        let mut c = conf("{}\n");
        let v = vars("r:\n  favicon: f.png\n  logo: l.png\n");
        update_theme(&mut c, &v, "r", "assets/img/meta");
        assert_eq!(lookup_str(c.raw(), "theme.favicon"), Some("f.png"));
        assert_eq!(lookup_str(c.raw(), "theme.logo"), Some("l.png"));
    }

    #[test]
    fn theme_without_repo_logo_uses_default_path() {
        let mut c = conf("theme: material\n");
        update_theme(&mut c, &vars("r: {}\n"), "r", "assets/img/meta");
        assert_eq!(lookup_str(c.raw(), "theme.name"), Some("material"));
        assert_eq!(lookup_str(c.raw(), "theme.logo"), Some("assets/img/meta/r_logo.png"));
    }

    // =========================================================================
    // apply_site_metadata
    // =========================================================================

    #[test]
    fn apply_all_rules() {
        let mut c = conf("site_name: ''\nrepo_url: ''\ntheme: material\n");
        let mut v = vars(REPO_VARS);
        v.insert("copyright".into(), "Team".into());
        let inputs = SiteInputs {
            slug: "my_docs",
            first_commit: None,
            current_year: 2026,
            logo_dir: "assets/img/meta",
        };
        apply_site_metadata(&mut c, &v, &inputs).unwrap();

        assert_eq!(c.get_str("site_name"), Some("My Docs"));
        assert_eq!(c.get_str("repo_name"), Some("My Docs"));
        assert_eq!(c.get_str("repo_url"), Some("https://gitlab.test/team/my-docs"));
        assert_eq!(c.get_str("copyright"), Some("Copyright &copy; 2026 - 2026 Team"));
    }
}
