//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.

use crate::patcher::PatchStage;
use derive_more::{Display, From};
use std::path::PathBuf;

/// The manifest region an anchor was being resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// The `PBXFileReference` record section.
    #[display("file reference section")]
    FileReference,
    /// The `PBXBuildFile` record section.
    #[display("build file section")]
    BuildFile,
    /// A `PBXGroup` children list.
    #[display("group children list")]
    Group,
    /// A build phase files list.
    #[display("build phase files list")]
    BuildPhase,
}

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The manifest file does not exist.
    #[from(ignore)]
    #[display("Manifest not found: {}", _0.display())]
    ManifestNotFound(PathBuf),

    /// A structural marker or label anchor is missing from a section.
    #[from(ignore)]
    #[display("Anchor not found in {section}: {detail}")]
    AnchorNotFound {
        /// Section whose anchor could not be resolved.
        section: SectionKind,
        /// What exactly was missing.
        detail: String,
    },

    /// The patch state machine was driven out of order.
    #[from(ignore)]
    #[display("Invalid patch transition: {from:?} -> {to:?}")]
    InvalidStage {
        /// Stage the patch was in.
        from: PatchStage,
        /// Stage that was requested.
        to: PatchStage,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Shorthand for an `AnchorNotFound` error.
    pub fn anchor(section: SectionKind, detail: impl Into<String>) -> Self {
        AppError::AnchorNotFound {
            section,
            detail: detail.into(),
        }
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_anchor_message_names_section() {
        let err = AppError::anchor(SectionKind::Group, "no group named 'Services'");
        assert_eq!(
            err.to_string(),
            "Anchor not found in group children list: no group named 'Services'"
        );
    }

    #[test]
    fn test_manifest_not_found_message() {
        let err = AppError::ManifestNotFound(PathBuf::from("App.xcodeproj/project.pbxproj"));
        assert_eq!(
            err.to_string(),
            "Manifest not found: App.xcodeproj/project.pbxproj"
        );
    }
}
