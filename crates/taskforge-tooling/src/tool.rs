use std::io::Error as IoError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// The executable could not be launched.
    #[error("Failed to start {}: {source}", executable.display())]
    Spawn {
        /// Executable that failed to start
        executable: PathBuf,
        /// Underlying launch error
        source: IoError,
    },

    /// A background output reader failed.
    #[error("Output reader failed: {0}")]
    Join(String),

    /// The provided input was invalid or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
