use core::result::Result as CoreResult;
use std::io::Error as IoError;

use thiserror::Error;
use toml::de::Error as TomlError;
use toml::ser::Error as TomlSerializeError;

/// Result type for core operations.
pub type Result<T> = CoreResult<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// TOML deserialization failed.
    #[error("TOML deserialization error: {0}")]
    Toml(#[from] TomlError),

    /// TOML serialization failed.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] TomlSerializeError),

    /// A required input is missing or unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The external executable could not be located.
    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    /// A general error not covered by other variants.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a precondition failure detected before any
    /// process was spawned.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::ExecutableNotFound(_))
    }
}
