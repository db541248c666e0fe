//! Variable data files.
//!
//! Every `*.yaml` / `*.yml` file directly under the data directory
//! (`docs/_data/` by default) contributes its top-level keys as variables.
//! Files are read in file-name order, so a later file wins on key clashes.
//!
//! ## File kinds
//!
//! | File | Kind | Holds |
//! |------|------|-------|
//! | `subrepo.yaml` | [`DataFileKind::Subrepo`] | the `subrepo` descriptor |
//! | `vars.yaml` | [`DataFileKind::Vars`] | site-wide values (`site_base_url`, `git_platform`, ...) |
//! | anything else | [`DataFileKind::Repo`] | one entry per repository, keyed by slug |
//!
//! Repo entries get defaults applied on load (see [`apply_repo_defaults`]):
//! a conventional logo path and python source paths for mkdocstrings.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot list {0}: {1}")]
    Walk(PathBuf, #[source] walkdir::Error),
    #[error("YAML error in {0}: {1}")]
    Yaml(PathBuf, #[source] serde_yaml::Error),
    #[error("Data file {0} must contain a mapping at the top level")]
    NotAMapping(PathBuf),
}

/// Variables available to the pipeline: the merged top-level keys of all data files.
pub type Variables = Mapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFileKind {
    Subrepo,
    Vars,
    Repo,
}

impl DataFileKind {
    pub fn from_path(path: &Path) -> Self {
        match path.file_name().and_then(|n| n.to_str()) {
            Some("subrepo.yaml" | "subrepo.yml") => DataFileKind::Subrepo,
            Some("vars.yaml" | "vars.yml") => DataFileKind::Vars,
            _ => DataFileKind::Repo,
        }
    }
}

/// Where a repo entry's site lives, relative to the project being built.
#[derive(Debug, Clone, Copy)]
pub struct RepoPlacement<'a> {
    /// Prefix for the default logo: the published URL of an external repo, empty otherwise.
    pub logo_prefix: &'a str,
    /// Directory of the repo relative to the project root, empty for the project itself.
    pub src_prefix: &'a str,
    /// Directory of default logos inside a site.
    pub logo_dir: &'a str,
}

/// Result of loading a data directory.
#[derive(Debug, Default)]
pub struct LoadedData {
    pub variables: Variables,
    /// `sys.path.append(...)` commands for the mkdocstrings python handler.
    pub setup_commands: Vec<String>,
    /// Files read, in order.
    pub files: Vec<PathBuf>,
}

fn is_yaml_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// Join URL-ish path parts with `/`, skipping empty parts.
pub fn join_url(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse one YAML data file into a mapping.
pub fn load_file(path: &Path) -> Result<Mapping, DataError> {
    let content = fs::read_to_string(path)?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|e| DataError::Yaml(path.to_path_buf(), e))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(DataError::NotAMapping(path.to_path_buf())),
    }
}

/// Fill in repo defaults on one repo entry. Returns its python setup commands.
///
/// - `logo` defaults to `<logo_prefix>/<logo_dir>/<name>_logo.png`.
/// - each `src_path` item becomes `sys.path.append('<src_prefix>/<item>')`.
pub fn apply_repo_defaults(entry: &mut Value, name: &str, placement: &RepoPlacement<'_>) -> Vec<String> {
    let Some(entry) = entry.as_mapping_mut() else {
        return Vec::new();
    };

    if !entry.contains_key("logo") {
        let file = format!("{name}_logo.png");
        let logo = join_url(&[placement.logo_prefix, placement.logo_dir, &file]);
        entry.insert(Value::String("logo".into()), Value::String(logo));
    }

    entry
        .get("src_path")
        .and_then(Value::as_sequence)
        .map(|paths| {
            paths
                .iter()
                .filter_map(Value::as_str)
                .map(|src| {
                    let full = join_url(&[placement.src_prefix, src]);
                    format!("sys.path.append('{full}')")
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Load every data file directly under `dir`.
///
/// A missing directory yields no variables.
pub fn load_data_dir(dir: &Path, logo_dir: &str) -> Result<LoadedData, DataError> {
    let mut loaded = LoadedData::default();
    if !dir.is_dir() {
        tracing::warn!("Data directory {} not found, no variables loaded", dir.display());
        return Ok(loaded);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| DataError::Walk(dir.to_path_buf(), e))?;
        if is_yaml_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    let placement = RepoPlacement {
        logo_prefix: "",
        src_prefix: "",
        logo_dir,
    };
    for path in files {
        let kind = DataFileKind::from_path(&path);
        tracing::debug!("Loading {:?} data file {}", kind, path.display());
        for (key, mut value) in load_file(&path)? {
            if kind == DataFileKind::Repo {
                if let Some(name) = key.as_str() {
                    loaded
                        .setup_commands
                        .extend(apply_repo_defaults(&mut value, name, &placement));
                }
            }
            loaded.variables.insert(key, value);
        }
        loaded.files.push(path);
    }
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mkdocs::lookup_str;
    use tempfile::TempDir;

    const PROJECT: RepoPlacement<'static> = RepoPlacement {
        logo_prefix: "",
        src_prefix: "",
        logo_dir: "assets/img/meta",
    };

    #[test]
    fn file_kind_from_name() {
        assert_eq!(DataFileKind::from_path(Path::new("d/subrepo.yml")), DataFileKind::Subrepo);
        assert_eq!(DataFileKind::from_path(Path::new("d/vars.yaml")), DataFileKind::Vars);
        assert_eq!(DataFileKind::from_path(Path::new("d/my_repo.yaml")), DataFileKind::Repo);
    }

    #[test]
    fn join_url_skips_empty_parts() {
        assert_eq!(join_url(&["", "assets/img", "x.png"]), "assets/img/x.png");
        assert_eq!(
            join_url(&["https://site.test/", "assets", "x.png"]),
            "https://site.test/assets/x.png"
        );
        assert_eq!(join_url(&["libs/core", "src"]), "libs/core/src");
    }

    #[test]
    fn repo_defaults_set_logo() {
        let mut entry: Value = serde_yaml::from_str("name: Core\n").unwrap();
        let commands = apply_repo_defaults(&mut entry, "core", &PROJECT);
        assert!(commands.is_empty());
        assert_eq!(
            entry.get("logo").and_then(Value::as_str),
            Some("assets/img/meta/core_logo.png")
        );
    }

    #[test]
    fn repo_defaults_keep_explicit_logo() {
        let mut entry: Value = serde_yaml::from_str("logo: custom.svg\n").unwrap();
        apply_repo_defaults(&mut entry, "core", &PROJECT);
        assert_eq!(entry.get("logo").and_then(Value::as_str), Some("custom.svg"));
    }

    #[test]
    fn repo_defaults_external_logo_uses_url() {
        let mut entry: Value = serde_yaml::from_str("name: Site\n").unwrap();
        let placement = RepoPlacement {
            logo_prefix: "https://site.test",
            src_prefix: "ext/site",
            logo_dir: "assets/img/meta",
        };
        apply_repo_defaults(&mut entry, "site", &placement);
        assert_eq!(
            entry.get("logo").and_then(Value::as_str),
            Some("https://site.test/assets/img/meta/site_logo.png")
        );
    }

    #[test]
    fn repo_defaults_src_paths_become_setup_commands() {
        let mut entry: Value = serde_yaml::from_str("src_path:\n  - src\n  - lib/py\n").unwrap();
        let placement = RepoPlacement {
            logo_prefix: "",
            src_prefix: "libs/core",
            logo_dir: "assets/img/meta",
        };
        let commands = apply_repo_defaults(&mut entry, "core", &placement);
        assert_eq!(
            commands,
            vec![
                "sys.path.append('libs/core/src')",
                "sys.path.append('libs/core/lib/py')"
            ]
        );
    }

    #[test]
    fn load_data_dir_merges_files_in_name_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.yaml"), "shared: from-a\nrepo_a:\n  name: A\n").unwrap();
        fs::write(tmp.path().join("vars.yml"), "shared: from-vars\nsite_base_url: https://x.test/\n")
            .unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(tmp.path().join("schema")).unwrap();
        fs::write(tmp.path().join("schema/repo.schema.yaml"), "type: map\n").unwrap();

        let loaded = load_data_dir(tmp.path(), "assets/img/meta").unwrap();

        assert_eq!(loaded.files.len(), 2);
        assert_eq!(lookup_str(&loaded.variables, "shared"), Some("from-vars"));
        assert_eq!(lookup_str(&loaded.variables, "site_base_url"), Some("https://x.test/"));
        assert_eq!(
            lookup_str(&loaded.variables, "repo_a.logo"),
            Some("assets/img/meta/repo_a_logo.png")
        );
        assert!(!loaded.variables.contains_key("type"));
    }

    #[test]
    fn vars_file_gets_no_repo_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("vars.yaml"), "git_platform:\n  name: GitLab\n").unwrap();
        let loaded = load_data_dir(tmp.path(), "assets/img/meta").unwrap();
        assert_eq!(lookup_str(&loaded.variables, "git_platform.logo"), None);
    }

    #[test]
    fn load_data_dir_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let loaded = load_data_dir(&tmp.path().join("nope"), "assets").unwrap();
        assert!(loaded.variables.is_empty());
    }

    #[test]
    fn load_file_rejects_non_mapping() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.yaml");
        fs::write(&path, "- a\n- b\n").unwrap();
        assert!(matches!(load_file(&path), Err(DataError::NotAMapping(_))));
    }

    #[test]
    fn load_file_reports_yaml_errors_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.yaml");
        fs::write(&path, "key: [unclosed\n").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.yaml"));
    }
}
