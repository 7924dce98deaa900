#![deny(missing_docs)]

//! # Check Command
//!
//! Reports whether files are already registered, without touching the manifest.

use crate::discover::resolve_manifest;
use crate::error::CliResult;
use crate::Status;
use pbxreg_core::is_registered;
use pbxreg_core::manifest::read_manifest;
use std::path::PathBuf;

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// File names or paths to look up; only the file name is matched.
    #[clap(required = true)]
    pub files: Vec<PathBuf>,

    /// Path to `project.pbxproj` or its `.xcodeproj` bundle.
    #[clap(long, env = "PBXREG_PROJECT")]
    pub project: Option<PathBuf>,
}

/// Executes the check.
///
/// Returns `Status::NotRegistered` if any file is missing from the manifest.
pub fn execute(args: &CheckArgs) -> CliResult<Status> {
    let manifest = resolve_manifest(args.project.as_deref())?;
    let text = read_manifest(&manifest)?;

    let mut all_present = true;
    for file in &args.files {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let present = is_registered(&text, &name);
        all_present &= present;
        println!(
            "{}: {}",
            name,
            if present { "registered" } else { "missing" }
        );
    }

    Ok(if all_present {
        Status::Ok
    } else {
        Status::NotRegistered
    })
}
