use taskforge_core::Error as CoreError;
use taskforge_tooling::ToolError;
use thiserror::Error;

/// Result type for signing operations.
pub type SignResult<T> = Result<T, SignError>;

/// Errors that stop a signing task before it reaches an outcome.
#[derive(Debug, Error)]
pub enum SignError {
    /// Inputs were unusable; nothing was launched.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The sign tool could not be run.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

impl SignError {
    /// Whether the task failed on its inputs rather than while running.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Core(error) if error.is_configuration())
    }
}
