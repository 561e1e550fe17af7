//! Taskforge CLI - build pipeline tasks that wrap external tools
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Allow for tests"
    )
)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser as _;
use cli::{Cli, Command};

mod cli;
mod handlers;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    handlers::init_logging(cli.log_file.as_deref())?;

    let passed = match cli.command {
        Command::Sign(args) => handlers::handle_sign(&args).await?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
