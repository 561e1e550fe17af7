//! Configuration for the signing task.
//!
//! Values come from a TOML file, are overridden by command-line options and
//! finally fall back to environment variables.

use crate::error::{Error, Result};
use crate::types::SigningRequest;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the certificate password.
pub const ENV_PFX_PASSWORD: &str = "TASKFORGE_PFX_PASSWORD";
/// Environment variable holding the path of the signing tool.
pub const ENV_SIGN_TOOL: &str = "TASKFORGE_SIGNTOOL";
/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "taskforge.toml";

/// Inputs recognised by the signing task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignConfig {
    /// Files to sign
    pub files: Vec<PathBuf>,
    /// Timestamp server URLs, tried in order
    pub timestamp_servers: Vec<String>,
    /// Certificate file
    pub pfx_file: Option<PathBuf>,
    /// Certificate file password
    pub pfx_password: Option<String>,
    /// Thumbprint of a certificate in the local store
    pub sha1_thumbprint: Option<String>,
    /// Signature description
    pub description: Option<String>,
    /// Explicit path of the signing tool
    pub sign_tool_executable: Option<PathBuf>,
    /// Report failures as warnings and let the build continue
    pub continue_on_failure: bool,
}

impl SignConfig {
    /// Get the per-user config directory (`~/.taskforge`)
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Other("Could not determine home directory".to_owned()))?;
        Ok(home.join(".taskforge"))
    }

    /// Find the config file to use when none was given explicitly.
    ///
    /// `taskforge.toml` in `working_dir` wins over `~/.taskforge/config.toml`.
    pub fn discover(working_dir: &Path) -> Option<PathBuf> {
        let local = working_dir.join(CONFIG_FILE_NAME);
        if local.is_file() {
            return Some(local);
        }

        Self::config_dir()
            .ok()
            .map(|dir| dir.join("config.toml"))
            .filter(|path| path.is_file())
    }

    /// Load config from a specific file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        tracing::debug!("Loaded sign configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to a specific file, creating parent directories
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Scalar options replace when set, lists replace when non-empty and
    /// `continue_on_failure` is set when either side sets it.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            files: if overrides.files.is_empty() {
                self.files
            } else {
                overrides.files
            },
            timestamp_servers: if overrides.timestamp_servers.is_empty() {
                self.timestamp_servers
            } else {
                overrides.timestamp_servers
            },
            pfx_file: overrides.pfx_file.or(self.pfx_file),
            pfx_password: overrides.pfx_password.or(self.pfx_password),
            sha1_thumbprint: overrides.sha1_thumbprint.or(self.sha1_thumbprint),
            description: overrides.description.or(self.description),
            sign_tool_executable: overrides.sign_tool_executable.or(self.sign_tool_executable),
            continue_on_failure: self.continue_on_failure || overrides.continue_on_failure,
        }
    }

    /// Fill unset secrets and tool path from the environment.
    ///
    /// `lookup` is usually `|name| std::env::var(name).ok()`.
    #[must_use]
    pub fn with_env_fallbacks<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.pfx_password.is_none() {
            self.pfx_password = lookup(ENV_PFX_PASSWORD);
        }
        if self.sign_tool_executable.is_none() {
            self.sign_tool_executable = lookup(ENV_SIGN_TOOL).map(PathBuf::from);
        }
        self
    }

    /// Build the signing request described by this config.
    pub fn to_request(&self) -> SigningRequest {
        SigningRequest {
            files: self.files.clone(),
            pfx_file: self.pfx_file.clone(),
            pfx_password: self.pfx_password.clone(),
            sha1_thumbprint: self.sha1_thumbprint.clone(),
            timestamp_servers: self.timestamp_servers.clone(),
            description: self.description.clone(),
        }
    }
}
