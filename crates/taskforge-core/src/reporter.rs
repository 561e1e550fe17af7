//! Host-facing log sink.
//!
//! Tasks only decide the severity and content of a message; where it ends up
//! is up to the [`Reporter`] the host hands in.

use std::sync::{Mutex, PoisonError};

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational message
    Info,
    /// Non-fatal problem
    Warning,
    /// Fatal problem
    Error,
}

/// Sink for the messages a task emits.
pub trait Reporter: Send + Sync {
    /// Report an informational message.
    fn info(&self, message: &str);

    /// Report a warning.
    fn warn(&self, message: &str);

    /// Report an error.
    fn error(&self, message: &str);
}

/// Report `message` as an error, or as a warning when the task is configured
/// to continue on failure.
pub fn report_or_continue(reporter: &dyn Reporter, message: &str, continue_on_failure: bool) {
    if continue_on_failure {
        reporter.warn(message);
    } else {
        reporter.error(message);
    }
}

/// Reporter that forwards every message to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Reporter that keeps every message in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages in the order they were reported.
    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages recorded with the given severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(entry_severity, _)| *entry_severity == severity)
            .map(|(_, message)| message)
            .collect()
    }

    /// Whether any message of any severity contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }

    fn push(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_owned()));
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.push(Severity::Error, message);
    }
}
