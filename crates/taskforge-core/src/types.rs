use std::fmt;
use std::path::{Path, PathBuf};

/// Everything needed to sign a set of files, built once per task execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningRequest {
    /// Files to sign, in the order they are passed to the tool
    pub files: Vec<PathBuf>,
    /// Certificate file (PFX) used when no thumbprint is given
    pub pfx_file: Option<PathBuf>,
    /// Password for the certificate file
    pub pfx_password: Option<String>,
    /// SHA1 thumbprint of a certificate in the local store
    pub sha1_thumbprint: Option<String>,
    /// Timestamp server URLs, tried in order
    pub timestamp_servers: Vec<String>,
    /// Optional description embedded in the signature
    pub description: Option<String>,
}

/// The signing identity a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity<'req> {
    /// Certificate selected by thumbprint from the certificate store
    Thumbprint(&'req str),
    /// Certificate read from a file on disk, with an optional password
    PfxFile {
        /// Path to the certificate file
        path: &'req Path,
        /// Password protecting the certificate file
        password: Option<&'req str>,
    },
}

impl SigningRequest {
    /// Resolve which identification mode this request uses.
    ///
    /// A non-blank thumbprint always wins. Otherwise the certificate file is
    /// used when it exists on disk. Returns `None` when neither is usable.
    pub fn identity(&self) -> Option<Identity<'_>> {
        if let Some(thumbprint) = non_blank(self.sha1_thumbprint.as_deref()) {
            return Some(Identity::Thumbprint(thumbprint));
        }

        let path = self.pfx_file.as_deref()?;
        if !path.is_file() {
            return None;
        }
        Some(Identity::PfxFile {
            path,
            password: self.secret(),
        })
    }

    /// The value that must never appear in logs.
    pub fn secret(&self) -> Option<&str> {
        self.pfx_password
            .as_deref()
            .filter(|password| !password.is_empty())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

/// Terminal state of one signing invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignOutcome {
    /// The tool exited with code 0
    Success,
    /// The tool failed because the timestamp server could not be reached
    TransientTimestampFailure,
    /// The tool failed for any other reason
    Failed,
}

impl SignOutcome {
    /// Whether the outcome counts as a successful signing.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for SignOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::TransientTimestampFailure => "timestamp server unreachable",
            Self::Failed => "failed",
        };
        formatter.write_str(label)
    }
}

/// A single launch of an external executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    /// Executable to launch
    pub executable: PathBuf,
    /// Arguments, already encoded into one command line
    pub argument_line: String,
    /// Directory the process starts in
    pub working_directory: PathBuf,
}

impl ProcessInvocation {
    /// Create an invocation from its parts.
    pub fn new(
        executable: impl Into<PathBuf>,
        argument_line: impl Into<String>,
        working_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            executable: executable.into(),
            argument_line: argument_line.into(),
            working_directory: working_directory.into(),
        }
    }
}

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputStream {
    /// Standard output
    Stdout,
    /// Standard error
    Stderr,
}

/// One line read from a child process, or the end of its stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    /// Stream the line was read from
    pub stream: OutputStream,
    /// Line text without its terminator; `None` marks the end of the stream
    pub text: Option<String>,
}

impl CapturedLine {
    /// A line of text read from `stream`.
    pub fn line(stream: OutputStream, text: impl Into<String>) -> Self {
        Self {
            stream,
            text: Some(text.into()),
        }
    }

    /// The end-of-stream marker for `stream`.
    pub fn end(stream: OutputStream) -> Self {
        Self { stream, text: None }
    }

    /// Whether this is the end-of-stream marker.
    pub fn is_end(&self) -> bool {
        self.text.is_none()
    }
}
