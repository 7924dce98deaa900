#![deny(missing_docs)]

//! # pbxreg Core
//!
//! Patch engine that registers a file in an Xcode project manifest by
//! inserting four cross-referencing entries: a file reference, a build file,
//! a group membership and a build phase membership.

/// Shared error types.
pub mod error;

/// Object identifier generation.
pub mod ident;

/// Section, object and list boundaries.
pub mod scan;

/// The registration request and entry formatting.
pub mod entry;

/// Idempotency guard.
pub mod registration;

/// Anchor resolution, insertion and the registration workflow.
pub mod patcher;

/// Reading and atomically rewriting the manifest file.
pub mod manifest;

pub use entry::{BuildPhase, GroupTarget, Registration};
pub use error::{AppError, AppResult, SectionKind};
pub use ident::{IdSource, ObjectId, RandomIds};
pub use manifest::{register_file, register_file_with, PatchReport, ReportStatus, WriteMode};
pub use patcher::{register, Anchor, AnchorPolicy, PatchOutcome, PatchStage};
pub use registration::is_registered;
