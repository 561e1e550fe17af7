//! Core types and traits for the taskforge build tasks.
//!
//! This crate provides the error taxonomy, the signing data model, the
//! host-facing [`Reporter`] seam and the TOML configuration layer shared by
//! the tooling, signing and CLI crates.
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        clippy::print_stdout,
        clippy::print_stderr,
        reason = "Allow for tests"
    )
)]

/// Configuration file and override handling.
pub mod config;
/// Error types and result definitions.
pub mod error;
/// Severity-aware log sink used by every task.
pub mod reporter;
/// Core data types for signing requests and process output.
pub mod types;

pub use config::{CONFIG_FILE_NAME, ENV_PFX_PASSWORD, ENV_SIGN_TOOL, SignConfig};
pub use error::{Error, Result};
pub use reporter::{RecordingReporter, Reporter, Severity, TracingReporter, report_or_continue};
pub use types::{
    CapturedLine, Identity, OutputStream, ProcessInvocation, SignOutcome, SigningRequest,
};
