//! Command-line interface definitions for the `sluice` binary.
//!
//! This module isolates the clap parser structures so the build script can
//! reuse them when generating the manual page.

use clap::Parser;

/// Top-level CLI for the `sluice` binary.
#[derive(Debug, Parser)]
#[command(
    name = "sluice",
    about = "Provision a file-storage account, pools, and a volume, then move the volume between pools",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Run the provisioning and pool-change workflow.
    #[command(name = "run", about = "Run the provisioning and pool-change workflow")]
    Run(RunCommand),
}

/// Arguments for the `sluice run` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct RunCommand {
    /// Delete every created resource after the pool change, innermost
    /// first. Forces teardown on even when the configuration leaves it off.
    #[arg(long)]
    pub(crate) cleanup: bool,
}
