#![deny(missing_docs)]

//! # Manifest Storage
//!
//! Reads the manifest once, runs the in-memory patch, and writes the result
//! back once. The write goes to a temporary file in the manifest's directory
//! which is then renamed over the original, so a failed run never leaves a
//! half-written manifest behind.

use crate::entry::Registration;
use crate::error::{AppError, AppResult};
use crate::ident::{IdSource, RandomIds};
use crate::patcher::{register, EntryIds, InsertedEntry, PatchOutcome, PatchStage};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Whether a successful patch is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Write the patched manifest back.
    Commit,
    /// Compute the patch but leave the file alone.
    DryRun,
}

/// How a registration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Entries inserted and written.
    Registered,
    /// Entries computed in a dry run; nothing written.
    Planned,
    /// The file was already present; nothing written.
    AlreadyRegistered,
}

/// Summary of one registration, suitable for printing or JSON output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PatchReport {
    /// The registered file name.
    pub file: String,
    /// The path the registration was requested for.
    pub path: String,
    /// Outcome.
    pub status: ReportStatus,
    /// Final lifecycle stage.
    pub stage: PatchStage,
    /// Generated identifiers, when anything was inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<EntryIds>,
    /// Inserted lines, in insertion order.
    pub inserted: Vec<InsertedEntry>,
}

/// Reads the whole manifest, failing with `ManifestNotFound` if it is absent.
pub fn read_manifest(path: &Path) -> AppResult<String> {
    if !path.is_file() {
        return Err(AppError::ManifestNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Replaces the manifest with `text` in a single rename.
pub fn write_manifest(path: &Path, text: &str) -> AppResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(text.as_bytes())?;
    tmp.flush()?;
    if let Ok(meta) = fs::metadata(path) {
        tmp.as_file().set_permissions(meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

/// Registers one file in the manifest at `path` using random identifiers.
pub fn register_file(
    path: &Path,
    registration: &Registration,
    mode: WriteMode,
) -> AppResult<PatchReport> {
    register_file_with(path, registration, mode, &mut RandomIds)
}

/// Registers one file in the manifest at `path` drawing ids from `source`.
pub fn register_file_with<S: IdSource>(
    path: &Path,
    registration: &Registration,
    mode: WriteMode,
    source: &mut S,
) -> AppResult<PatchReport> {
    let original = read_manifest(path)?;
    let file = registration.file_name().to_string();
    let rel_path = registration.relative_path().display().to_string();

    let patched = match register(&original, registration, source)? {
        PatchOutcome::AlreadyRegistered => {
            return Ok(PatchReport {
                file,
                path: rel_path,
                status: ReportStatus::AlreadyRegistered,
                stage: PatchStage::AlreadyRegistered,
                ids: None,
                inserted: Vec::new(),
            })
        }
        PatchOutcome::Patched(patched) => patched,
    };

    let (status, stage) = match mode {
        WriteMode::DryRun => (ReportStatus::Planned, patched.stage),
        WriteMode::Commit => {
            write_manifest(path, &patched.text)?;
            let stage = patched.stage.advance(PatchStage::Committed)?;
            tracing::info!(file = %file, manifest = %path.display(), "registered");
            (ReportStatus::Registered, stage)
        }
    };

    Ok(PatchReport {
        file,
        path: rel_path,
        status,
        stage,
        ids: Some(patched.ids),
        inserted: patched.inserted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_manifest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.pbxproj");
        let reg = Registration::new("App/A.swift").unwrap();
        let err = register_file(&path, &reg, WriteMode::Commit).unwrap_err();
        assert!(matches!(err, AppError::ManifestNotFound(p) if p == path));
    }

    #[test]
    fn test_report_carries_requested_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.pbxproj");
        fs::write(&path, "\t\tAAAAAAAAAAAAAAAAAAAAAAAA /* A.swift */ = {};\n").unwrap();

        let reg = Registration::new("App/A.swift").unwrap();
        let report = register_file(&path, &reg, WriteMode::Commit).unwrap();
        assert_eq!(report.status, ReportStatus::AlreadyRegistered);
        assert_eq!(report.file, "A.swift");
        assert_eq!(report.path, "App/A.swift");
    }

    #[test]
    fn test_write_manifest_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("project.pbxproj");
        fs::write(&path, "old").unwrap();
        write_manifest(&path, "new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
