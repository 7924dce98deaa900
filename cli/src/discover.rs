#![deny(missing_docs)]

//! # Manifest Discovery
//!
//! Finds the `project.pbxproj` to patch. An explicit path may name either
//! the manifest itself or its `.xcodeproj` bundle; otherwise the working
//! directory is searched one level deep for a single `*.xcodeproj`.

use crate::error::{CliError, CliResult};
use std::env;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MANIFEST_NAME: &str = "project.pbxproj";

/// Returns the manifest inside `root/*.xcodeproj/`, requiring exactly one.
pub fn find_manifest(root: &Path) -> CliResult<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| {
            p.file_name().is_some_and(|n| n == MANIFEST_NAME)
                && p
                    .parent()
                    .and_then(|d| d.extension())
                    .is_some_and(|ext| ext == "xcodeproj")
        })
        .collect();

    match found.len() {
        0 => Err(CliError::General(format!(
            "No *.xcodeproj/{} found under {:?}",
            MANIFEST_NAME, root
        ))),
        1 => Ok(found.remove(0)),
        n => Err(CliError::General(format!(
            "Found {} Xcode projects under {:?}; pass --project to pick one",
            n, root
        ))),
    }
}

/// Resolves the manifest path from an optional `--project` value.
pub fn resolve_manifest(explicit: Option<&Path>) -> CliResult<PathBuf> {
    let path = match explicit {
        Some(p) if p.extension().is_some_and(|ext| ext == "xcodeproj") => p.join(MANIFEST_NAME),
        Some(p) => p.to_path_buf(),
        None => find_manifest(&env::current_dir()?)?,
    };
    tracing::debug!(manifest = %path.display(), "using manifest");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_finds_single_project() {
        let dir = tempdir().unwrap();
        let bundle = dir.path().join("App.xcodeproj");
        fs::create_dir(&bundle).unwrap();
        fs::write(bundle.join(MANIFEST_NAME), "{}").unwrap();

        assert_eq!(find_manifest(dir.path()).unwrap(), bundle.join(MANIFEST_NAME));
    }

    #[test]
    fn test_rejects_ambiguous_projects() {
        let dir = tempdir().unwrap();
        for name in ["A.xcodeproj", "B.xcodeproj"] {
            let bundle = dir.path().join(name);
            fs::create_dir(&bundle).unwrap();
            fs::write(bundle.join(MANIFEST_NAME), "{}").unwrap();
        }

        let err = find_manifest(dir.path()).unwrap_err();
        assert!(format!("{}", err).contains("pass --project"));
    }

    #[test]
    fn test_no_project() {
        let dir = tempdir().unwrap();
        assert!(find_manifest(dir.path()).is_err());
    }

    #[test]
    fn test_explicit_bundle_path() {
        let path = resolve_manifest(Some(Path::new("App.xcodeproj"))).unwrap();
        assert_eq!(path, Path::new("App.xcodeproj").join(MANIFEST_NAME));

        let direct = resolve_manifest(Some(Path::new("custom/project.pbxproj"))).unwrap();
        assert_eq!(direct, Path::new("custom/project.pbxproj"));
    }
}
