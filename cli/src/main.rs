#![deny(missing_docs)]

//! # pbxreg CLI
//!
//! Command Line Interface for registering files in Xcode project manifests.
//!
//! Supported Commands:
//! - `add`: Registers files (file reference, build file, group, build phase).
//! - `check`: Reports whether files are already registered.
//!
//! Exit statuses: `0` success, `1` failure, `2` usage error, `3` every file
//! was already registered, `4` a checked file is not registered.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod add;
mod check;
mod discover;
mod error;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Register files in Xcode project manifests")]
struct Cli {
    /// Log anchor resolution and patch stages to stderr.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register files in the project manifest.
    Add(add::AddArgs),
    /// Report whether files are already registered.
    Check(check::CheckArgs),
}

/// Non-error command results, each with its own exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The command did what was asked.
    Ok,
    /// Every file was already registered; nothing changed.
    AlreadyRegistered,
    /// At least one checked file is not registered.
    NotRegistered,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Ok => ExitCode::SUCCESS,
            Status::AlreadyRegistered => ExitCode::from(3),
            Status::NotRegistered => ExitCode::from(4),
        }
    }
}

/// Initialize tracing on stderr so stdout carries only command output.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pbxreg_cli=debug,pbxreg_core=debug"
    } else {
        "pbxreg_cli=warn,pbxreg_core=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Add(args) => add::execute(args),
        Commands::Check(args) => check::execute(args),
    };

    match result {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_flags() {
        let cli = Cli::try_parse_from([
            "pbxreg",
            "add",
            "App/Y.swift",
            "--group",
            "Services",
            "--phase",
            "resources",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.group.as_deref(), Some("Services"));
                assert_eq!(args.phase, Some(add::PhaseArg::Resources));
                assert!(args.dry_run);
            }
            Commands::Check(_) => panic!("expected add"),
        }
    }

    #[test]
    fn test_add_requires_a_file() {
        assert!(Cli::try_parse_from(["pbxreg", "add"]).is_err());
    }
}
