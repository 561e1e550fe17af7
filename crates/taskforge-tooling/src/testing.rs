//! Process doubles for tests.

use std::collections::VecDeque;
use std::io::{Cursor, Error as IoError};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use taskforge_core::ProcessInvocation;

use crate::process::{ProcessSpawner, SpawnedProcess};
use crate::tool::{ToolError, ToolResult};

/// Output and exit code of one scripted process run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedRun {
    /// Text written to standard output
    pub stdout: String,
    /// Text written to standard error
    pub stderr: String,
    /// Exit code reported once both streams are read
    pub exit_code: i32,
}

impl ScriptedRun {
    /// A run that prints nothing and exits with `exit_code`.
    pub fn exit(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// Set the standard output text.
    #[must_use]
    pub fn with_stdout(mut self, text: &str) -> Self {
        text.clone_into(&mut self.stdout);
        self
    }

    /// Set the standard error text.
    #[must_use]
    pub fn with_stderr(mut self, text: &str) -> Self {
        text.clone_into(&mut self.stderr);
        self
    }
}

/// Spawner that replays [`ScriptedRun`]s in order and records every launch.
#[derive(Debug, Default)]
pub struct ScriptedSpawner {
    runs: Mutex<VecDeque<ScriptedRun>>,
    invocations: Mutex<Vec<ProcessInvocation>>,
}

impl ScriptedSpawner {
    /// Create a spawner that replays `runs`.
    pub fn new(runs: impl IntoIterator<Item = ScriptedRun>) -> Self {
        Self {
            runs: Mutex::new(runs.into_iter().collect()),
            invocations: Mutex::default(),
        }
    }

    /// Every invocation launched so far.
    pub fn invocations(&self) -> Vec<ProcessInvocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ProcessSpawner for ScriptedSpawner {
    async fn spawn(&self, invocation: &ProcessInvocation) -> ToolResult<SpawnedProcess> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(invocation.clone());

        let run = self
            .runs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| ToolError::InvalidInput("no scripted run left".to_owned()))?;

        let exit_code = run.exit_code;
        Ok(SpawnedProcess {
            stdout: Box::new(Cursor::new(run.stdout.into_bytes())),
            stderr: Box::new(Cursor::new(run.stderr.into_bytes())),
            exit: Box::pin(async move { Ok::<_, IoError>(exit_code) }),
        })
    }
}
