//! Launching external tools and streaming their output.
//!
//! The runner reads both output streams on background tasks that push
//! [`CapturedLine`]s into a channel. The caller drains that channel itself, so
//! the line callbacks always run on the calling task, and a run only completes
//! once both streams reported their end marker and the process has exited.

use std::io::Error as IoError;
use std::process::Stdio;

use async_trait::async_trait;
use futures::future::BoxFuture;
use taskforge_core::{CapturedLine, OutputStream, ProcessInvocation, Reporter};
use tokio::io::{AsyncBufReadExt as _, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

#[cfg(not(windows))]
use crate::encode::split_command_line;
use crate::redact::SecretRedactor;
use crate::tool::{ToolError, ToolResult};

/// Boxed output stream of a spawned process.
pub type OutputReader = Box<dyn AsyncRead + Send + Unpin>;

/// Handles to a process that has been started.
pub struct SpawnedProcess {
    /// Standard output of the process
    pub stdout: OutputReader,
    /// Standard error of the process
    pub stderr: OutputReader,
    /// Resolves to the exit code once the process has exited
    pub exit: BoxFuture<'static, Result<i32, IoError>>,
}

/// Starts processes for a [`ProcessRunner`].
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Launch the process described by `invocation`.
    ///
    /// # Errors
    ///
    /// Returns a `ToolError` when the process cannot be started.
    async fn spawn(&self, invocation: &ProcessInvocation) -> ToolResult<SpawnedProcess>;
}

/// Spawns real operating system processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

#[async_trait]
impl ProcessSpawner for SystemSpawner {
    async fn spawn(&self, invocation: &ProcessInvocation) -> ToolResult<SpawnedProcess> {
        let mut command = Command::new(&invocation.executable);
        apply_argument_line(&mut command, &invocation.argument_line);
        command
            .current_dir(&invocation.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            executable: invocation.executable.clone(),
            source,
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| IoError::other("stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| IoError::other("stderr was not captured"))?;

        // The child moves into the exit future; dropping it kills the process.
        let exit = Box::pin(async move {
            let status = child.wait().await?;
            Ok::<_, IoError>(status.code().unwrap_or(-1))
        });

        Ok(SpawnedProcess {
            stdout: Box::new(stdout),
            stderr: Box::new(stderr),
            exit,
        })
    }
}

#[cfg(windows)]
fn apply_argument_line(command: &mut Command, argument_line: &str) {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command
        .raw_arg(argument_line)
        .creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn apply_argument_line(command: &mut Command, argument_line: &str) {
    command.args(split_command_line(argument_line));
}

/// Runs one process at a time and reports its output line by line.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner<S> {
    spawner: S,
    redactor: SecretRedactor,
}

impl<S: ProcessSpawner> ProcessRunner<S> {
    /// Create a runner that launches processes through `spawner`.
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            redactor: SecretRedactor::default(),
        }
    }

    /// Mask a secret in every message and line this runner emits.
    #[must_use]
    pub fn with_redactor(mut self, redactor: SecretRedactor) -> Self {
        self.redactor = redactor;
        self
    }

    /// The spawner used to start processes.
    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Run `invocation` to completion and return its exit code.
    ///
    /// `on_stdout` and `on_stderr` receive every completed line, already
    /// redacted, in arrival order per stream. The call returns only after the
    /// process exited and both output streams reached their end.
    ///
    /// # Errors
    ///
    /// Returns a `ToolError` if the process cannot be started, an output
    /// stream fails, or waiting for the exit fails.
    pub async fn run<O, E>(
        &self,
        invocation: &ProcessInvocation,
        reporter: &dyn Reporter,
        mut on_stdout: O,
        mut on_stderr: E,
    ) -> ToolResult<i32>
    where
        O: FnMut(&str) + Send,
        E: FnMut(&str) + Send,
    {
        let executable = invocation.executable.display().to_string();
        let arguments = self.redactor.redact(&invocation.argument_line).into_owned();
        reporter.info(&format!("Starting process: \"{executable}\" {arguments}"));

        let SpawnedProcess {
            stdout,
            stderr,
            exit,
        } = self.spawner.spawn(invocation).await?;

        let (sender, mut receiver) = unbounded_channel();
        let mut readers = ReaderGuard(vec![
            tokio::spawn(pump_lines(stdout, OutputStream::Stdout, sender.clone())),
            tokio::spawn(pump_lines(stderr, OutputStream::Stderr, sender)),
        ]);

        let mut open_streams = 2_u8;
        while open_streams > 0 {
            let Some(captured) = receiver.recv().await else {
                break;
            };
            match (captured.stream, captured.text) {
                (OutputStream::Stdout, Some(text)) => on_stdout(&*self.redactor.redact(&text)),
                (OutputStream::Stderr, Some(text)) => on_stderr(&*self.redactor.redact(&text)),
                (stream, None) => {
                    tracing::debug!("{stream:?} of {executable} closed");
                    open_streams -= 1;
                }
            }
        }

        readers.join().await?;
        let exit_code = exit.await?;
        reporter.info(&format!(
            "Exiting process: \"{executable}\". Exit code: {exit_code}"
        ));
        Ok(exit_code)
    }
}

/// Forward every line of `reader` into `sender`, then the end marker.
async fn pump_lines(
    reader: OutputReader,
    stream: OutputStream,
    sender: UnboundedSender<CapturedLine>,
) -> Result<(), IoError> {
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buffer);
        let line = text.trim_end_matches(['\r', '\n']);
        if sender.send(CapturedLine::line(stream, line)).is_err() {
            return Ok(());
        }
    }

    if sender.send(CapturedLine::end(stream)).is_err() {
        tracing::debug!("{stream:?} ended after the runner stopped listening");
    }
    Ok(())
}

/// Aborts output readers that are still running when dropped.
struct ReaderGuard(Vec<JoinHandle<Result<(), IoError>>>);

impl ReaderGuard {
    async fn join(&mut self) -> ToolResult<()> {
        for handle in &mut self.0 {
            handle
                .await
                .map_err(|err| ToolError::Join(err.to_string()))??;
        }
        Ok(())
    }
}

impl Drop for ReaderGuard {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}
