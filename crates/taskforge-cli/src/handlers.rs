//! Command handlers for CLI operations

use std::env;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal as _};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use taskforge_core::{SignConfig, TracingReporter};
use taskforge_signing::SignTask;
use taskforge_tooling::SystemSpawner;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::cli::SignArgs;

const DEFAULT_LOG_FILTER: &str =
    "taskforge_core=info,taskforge_tooling=info,taskforge_signing=info,taskforge_cli=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
}

/// Install the global subscriber, logging to `log_file` or stderr.
///
/// # Errors
/// Returns an error if the log file cannot be opened
pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;

            Registry::default()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_writer(Arc::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
        None => {
            Registry::default()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(io::stderr().is_terminal())
                        .with_target(false),
                )
                .init();
        }
    }
    Ok(())
}

/// Build the effective sign settings: config file, then flags, then environment.
///
/// # Errors
/// Returns an error if an explicit or discovered config file cannot be loaded
pub fn resolve_sign_config(args: &SignArgs, working_dir: &Path) -> Result<SignConfig> {
    let config_path = args
        .config
        .clone()
        .or_else(|| SignConfig::discover(working_dir));

    let from_file = match config_path {
        Some(path) => {
            tracing::debug!("Using config file {}", path.display());
            SignConfig::load_from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => SignConfig::default(),
    };

    Ok(from_file
        .merge(args.overrides())
        .with_env_fallbacks(|name| env::var(name).ok()))
}

/// Handle the `sign` task
///
/// Returns whether the build should pass.
///
/// # Errors
/// Returns an error if the settings cannot be loaded; signing failures are
/// logged and reported through the return value instead
pub async fn handle_sign(args: &SignArgs) -> Result<bool> {
    let working_dir = env::current_dir()?;
    let config = resolve_sign_config(args, &working_dir)?;

    let task = SignTask::new(&config, SystemSpawner).with_working_directory(working_dir);
    Ok(task.execute(&TracingReporter).await)
}
