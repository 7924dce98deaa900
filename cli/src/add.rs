#![deny(missing_docs)]

//! # Add Command
//!
//! Registers one or more files in the project manifest.
//!
//! Each file is its own atomic registration: the manifest is read, patched in
//! memory and written back before the next file is considered. The first
//! failure stops the run; files registered before it stay registered.

use crate::discover::resolve_manifest;
use crate::error::{CliError, CliResult};
use crate::Status;
use pbxreg_core::{
    register_file, AnchorPolicy, BuildPhase, PatchReport, Registration, ReportStatus, WriteMode,
};
use std::path::{Path, PathBuf};

/// Build phase accepted on the command line.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseArg {
    /// Compile sources.
    Sources,
    /// Copy bundle resources.
    Resources,
}

impl From<PhaseArg> for BuildPhase {
    fn from(arg: PhaseArg) -> Self {
        match arg {
            PhaseArg::Sources => BuildPhase::Sources,
            PhaseArg::Resources => BuildPhase::Resources,
        }
    }
}

/// Arguments for the add command.
#[derive(clap::Args, Debug, Clone)]
pub struct AddArgs {
    /// Files to register, relative to the project root (e.g. `App/Services/Api.swift`).
    #[clap(required = true)]
    pub files: Vec<PathBuf>,

    /// Path to `project.pbxproj` or its `.xcodeproj` bundle.
    /// Discovered in the current directory when omitted.
    #[clap(long, env = "PBXREG_PROJECT")]
    pub project: Option<PathBuf>,

    /// Group receiving the files. Defaults to each file's parent directory name.
    #[clap(long)]
    pub group: Option<String>,

    /// Build phase override. Inferred from the file type when omitted.
    #[clap(long, value_enum)]
    pub phase: Option<PhaseArg>,

    /// Insert the new records right after this existing file's records.
    #[clap(long, value_name = "FILE_NAME")]
    pub after: Option<String>,

    /// Compute the entries without writing the manifest.
    #[clap(long)]
    pub dry_run: bool,

    /// Print one JSON report per file instead of text.
    #[clap(long)]
    pub json: bool,
}

fn build_registration(args: &AddArgs, file: &Path) -> CliResult<Registration> {
    let mut registration = Registration::new(file)?;
    if let Some(group) = &args.group {
        registration = registration.with_group(group.clone());
    }
    if let Some(phase) = args.phase {
        registration = registration.with_phase(phase.into());
    }
    if let Some(sibling) = &args.after {
        let anchors = AnchorPolicy::after_sibling(sibling);
        registration = registration.with_anchors(anchors);
    }
    Ok(registration)
}

fn print_report(report: &PatchReport, json: bool) -> CliResult<()> {
    if json {
        let line = serde_json::to_string(report)
            .map_err(|e| CliError::General(format!("Failed to encode report: {}", e)))?;
        println!("{}", line);
        return Ok(());
    }

    match report.status {
        ReportStatus::AlreadyRegistered => {
            println!("{} is already in the project, skipping.", report.path)
        }
        ReportStatus::Registered => println!("Registered {}", report.path),
        ReportStatus::Planned => println!("Would register {}", report.path),
    }
    for entry in &report.inserted {
        println!("  + [{}] {}", entry.section, entry.line.trim_start());
    }
    Ok(())
}

/// Executes the add command.
///
/// Returns `Status::AlreadyRegistered` only when every file was already present.
pub fn execute(args: &AddArgs) -> CliResult<Status> {
    let manifest = resolve_manifest(args.project.as_deref())?;
    let mode = if args.dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Commit
    };

    let mut changed = false;
    for file in &args.files {
        let registration = build_registration(args, file)?;
        let report = register_file(&manifest, &registration, mode).map_err(|e| {
            CliError::General(format!(
                "Failed to register {}: {}",
                registration.file_name(),
                e
            ))
        })?;
        changed |= report.status != ReportStatus::AlreadyRegistered;
        print_report(&report, args.json)?;
    }

    Ok(if changed {
        Status::Ok
    } else {
        Status::AlreadyRegistered
    })
}
