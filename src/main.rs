//! Binary entry point for the sluice CLI.

use std::env;
use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use sluice::{Reporter, RestClient, RestError, Workflow, WorkflowConfig, WorkflowError};

mod cli;

use cli::{Cli, RunCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("client error: {0}")]
    Client(String),
    #[error("workflow failed: {0}")]
    Workflow(#[from] WorkflowError<RestError>),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Run(command) => run_command(command).await,
    }
}

async fn run_command(args: RunCommand) -> Result<i32, CliError> {
    if let Some(result) = fake_run_from_env() {
        return result;
    }

    let mut config =
        WorkflowConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    if args.cleanup {
        config.cleanup = true;
    }
    let plan = config
        .as_plan()
        .map_err(|err| CliError::Config(err.to_string()))?;
    let client = RestClient::new(&config).map_err(|err| CliError::Client(err.to_string()))?;

    let mut reporter = Reporter::stdout();
    reporter.banner("sluice", env!("CARGO_PKG_VERSION"));

    let mut workflow = Workflow::new(client, reporter);
    workflow.execute(&plan).await?;

    let mut finished = workflow.into_reporter();
    finished.info("Workflow completed successfully");
    Ok(0)
}

/// Short-circuits the cloud path when a fake-run mode is set, so the binary
/// can be exercised by smoke tests without credentials or a provider.
fn fake_run_from_env() -> Option<Result<i32, CliError>> {
    let mode = env::var("SLUICE_FAKE_RUN_MODE").ok()?;
    match mode.as_str() {
        "success" => {
            writeln!(io::stdout(), "fake workflow complete").ok();
            Some(Ok(0))
        }
        "provider-error" => Some(Err(CliError::Client(String::from(
            "fake provider failure",
        )))),
        _ => None,
    }
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_renders_single_line() {
        let mut buf = Vec::new();
        let err = CliError::Client(String::from("fake provider failure"));
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert_eq!(rendered, "client error: fake provider failure\n");
    }
}
