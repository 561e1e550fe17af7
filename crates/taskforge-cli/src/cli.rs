use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use taskforge_core::SignConfig;

/// Command-line arguments for taskforge
#[derive(Debug, Parser)]
#[command(name = "taskforge", version, about = "Build pipeline tasks wrapping external tools")]
pub struct Cli {
    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Task to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available tasks
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign files with the signing tool, retrying across timestamp servers
    Sign(SignArgs),
}

/// Options of the `sign` task
#[derive(Debug, Default, Args)]
pub struct SignArgs {
    /// TOML file with sign settings [default: ./taskforge.toml or ~/.taskforge/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// File to sign (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Timestamp server URL, tried in the given order (repeatable)
    #[arg(long = "timestamp-server", value_name = "URL")]
    pub timestamp_servers: Vec<String>,

    /// Certificate file
    #[arg(long, value_name = "PATH")]
    pub pfx_file: Option<PathBuf>,

    /// Certificate file password
    #[arg(long, value_name = "PASSWORD")]
    pub pfx_password: Option<String>,

    /// SHA1 thumbprint of a certificate in the local store
    #[arg(long = "sha1", value_name = "THUMBPRINT")]
    pub sha1_thumbprint: Option<String>,

    /// Description embedded in the signature
    #[arg(long, value_name = "TEXT")]
    pub description: Option<String>,

    /// Path of the signing tool
    #[arg(long = "sign-tool", value_name = "PATH")]
    pub sign_tool: Option<PathBuf>,

    /// Report failures as warnings and exit successfully
    #[arg(long)]
    pub continue_on_failure: bool,
}

impl SignArgs {
    /// The settings given on the command line, to be layered over the file.
    pub fn overrides(&self) -> SignConfig {
        SignConfig {
            files: self.files.clone(),
            timestamp_servers: self.timestamp_servers.clone(),
            pfx_file: self.pfx_file.clone(),
            pfx_password: self.pfx_password.clone(),
            sha1_thumbprint: self.sha1_thumbprint.clone(),
            description: self.description.clone(),
            sign_tool_executable: self.sign_tool.clone(),
            continue_on_failure: self.continue_on_failure,
        }
    }
}
