//! Signing attempts across timestamp servers.
//!
//! Each server gets one fresh process. An attempt that failed only because
//! its timestamp server was unreachable moves on to the next server; success
//! or any other failure ends the run.

use std::path::Path;

use taskforge_core::{ProcessInvocation, Reporter, SignOutcome, SigningRequest, report_or_continue};
use taskforge_tooling::{ProcessRunner, ProcessSpawner, ToolError, ToolResult};

use crate::classify::{LineClass, classify};
use crate::command::build_command_line;

/// Result of one attempt against one timestamp server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Timestamp server used
    pub server: String,
    /// Classified outcome
    pub outcome: SignOutcome,
    /// Exit code of the sign tool
    pub exit_code: i32,
}

/// Outcome of a signing run and the attempts that led to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignReport {
    /// Outcome of the last attempt
    pub outcome: SignOutcome,
    /// Attempts in the order they were made
    pub attempts: Vec<AttemptRecord>,
}

/// Combine an exit code with what the error output said.
///
/// Exit code 0 is a success even if a transient line was seen.
pub fn outcome_for(exit_code: i32, saw_transient_failure: bool) -> SignOutcome {
    if exit_code == 0 {
        SignOutcome::Success
    } else if saw_transient_failure {
        SignOutcome::TransientTimestampFailure
    } else {
        SignOutcome::Failed
    }
}

/// Runs the sign tool once per timestamp server until an attempt is conclusive.
#[derive(Debug)]
pub struct RetryOrchestrator<'task, S> {
    runner: &'task ProcessRunner<S>,
    executable: &'task Path,
    working_directory: &'task Path,
    continue_on_failure: bool,
}

impl<'task, S: ProcessSpawner> RetryOrchestrator<'task, S> {
    /// Create an orchestrator launching `executable` in `working_directory`.
    pub fn new(
        runner: &'task ProcessRunner<S>,
        executable: &'task Path,
        working_directory: &'task Path,
    ) -> Self {
        Self {
            runner,
            executable,
            working_directory,
            continue_on_failure: false,
        }
    }

    /// Report tool errors as warnings instead of errors.
    #[must_use]
    pub fn continue_on_failure(mut self, continue_on_failure: bool) -> Self {
        self.continue_on_failure = continue_on_failure;
        self
    }

    /// Sign `request`, trying its timestamp servers in order.
    ///
    /// # Errors
    ///
    /// Returns a `ToolError` if the request lists no timestamp servers or the
    /// sign tool cannot be run.
    pub async fn sign(
        &self,
        request: &SigningRequest,
        reporter: &dyn Reporter,
    ) -> ToolResult<SignReport> {
        let servers = &request.timestamp_servers;
        let mut attempts = Vec::with_capacity(servers.len());

        for (index, server) in servers.iter().enumerate() {
            reporter.info(&format!(
                "Signing with timestamp server {server} (attempt {} of {})",
                index + 1,
                servers.len()
            ));
            let attempt = self.attempt(request, server, reporter).await?;
            let outcome = attempt.outcome;
            attempts.push(attempt);

            if outcome != SignOutcome::TransientTimestampFailure {
                break;
            }
            if index + 1 < servers.len() {
                reporter.warn(&format!(
                    "Timestamp server {server} could not be reached, trying the next one"
                ));
            }
        }

        let outcome = attempts
            .last()
            .map(|attempt| attempt.outcome)
            .ok_or_else(|| ToolError::InvalidInput("no timestamp servers to try".to_owned()))?;
        Ok(SignReport { outcome, attempts })
    }

    async fn attempt(
        &self,
        request: &SigningRequest,
        server: &str,
        reporter: &dyn Reporter,
    ) -> ToolResult<AttemptRecord> {
        let invocation = ProcessInvocation::new(
            self.executable,
            build_command_line(request, server),
            self.working_directory,
        );
        let continue_on_failure = self.continue_on_failure;
        let mut saw_transient_failure = false;

        let exit_code = self
            .runner
            .run(
                &invocation,
                reporter,
                |line| reporter.info(line),
                |line| {
                    if classify(line) == LineClass::TransientTimestampFailure {
                        saw_transient_failure = true;
                    }
                    report_or_continue(reporter, line, continue_on_failure);
                },
            )
            .await?;

        if exit_code != 0 {
            report_or_continue(
                reporter,
                &format!("Sign tool exited with code {exit_code}"),
                continue_on_failure,
            );
        }

        let outcome = outcome_for(exit_code, saw_transient_failure);
        tracing::debug!("Attempt against {server} finished: {outcome}");
        Ok(AttemptRecord {
            server: server.to_owned(),
            outcome,
            exit_code,
        })
    }
}
