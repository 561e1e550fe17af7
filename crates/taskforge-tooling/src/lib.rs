//! Subprocess plumbing for the taskforge build tasks.
//!
//! This crate provides:
//! - Command-line argument encoding and decoding
//! - Secret redaction for log lines
//! - `ProcessRunner` for launching tools and streaming their output
//! - Executable discovery from explicit paths and well-known locations
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

/// Argument quoting compatible with the C runtime parser.
mod encode;
/// Process launching and output streaming.
mod process;
/// Secret masking for log output.
mod redact;
/// Executable path resolution.
mod resolve;
/// Process doubles for tests.
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
/// Error types shared by the tooling.
mod tool;

pub use encode::{encode_argument, split_command_line};
pub use process::{OutputReader, ProcessRunner, ProcessSpawner, SpawnedProcess, SystemSpawner};
pub use redact::{SecretRedactor, redact};
pub use resolve::{SIGN_TOOL_FILE_NAME, default_search_list, resolve_executable_path};
pub use tool::{ToolError, ToolResult};
