//! The signing task as the build sees it.

use std::env;
use std::path::PathBuf;

use taskforge_core::{
    Error as CoreError, Reporter, SignConfig, SignOutcome, SigningRequest, report_or_continue,
};
use taskforge_tooling::{
    ProcessRunner, ProcessSpawner, SIGN_TOOL_FILE_NAME, SecretRedactor, default_search_list,
    resolve_executable_path,
};

use crate::error::SignResult;
use crate::retry::{RetryOrchestrator, SignReport};

/// Signs files with the external sign tool and reports pass/fail to the build.
#[derive(Debug)]
pub struct SignTask<S> {
    request: SigningRequest,
    sign_tool: Option<PathBuf>,
    search_list: Vec<PathBuf>,
    working_directory: Option<PathBuf>,
    continue_on_failure: bool,
    runner: ProcessRunner<S>,
}

impl<S: ProcessSpawner> SignTask<S> {
    /// Create a task from `config`, launching the tool through `spawner`.
    ///
    /// The tool is searched in the well-known SDK locations unless the config
    /// names it explicitly.
    pub fn new(config: &SignConfig, spawner: S) -> Self {
        let request = config.to_request();
        let runner =
            ProcessRunner::new(spawner).with_redactor(SecretRedactor::new(request.secret()));
        Self {
            request,
            sign_tool: config.sign_tool_executable.clone(),
            search_list: default_search_list(|name| env::var(name).ok()),
            working_directory: None,
            continue_on_failure: config.continue_on_failure,
            runner,
        }
    }

    /// Replace the locations searched for the sign tool.
    #[must_use]
    pub fn with_search_list(mut self, search_list: Vec<PathBuf>) -> Self {
        self.search_list = search_list;
        self
    }

    /// Run the tool in `directory` instead of the current directory.
    #[must_use]
    pub fn with_working_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }

    /// The request this task signs.
    pub fn request(&self) -> &SigningRequest {
        &self.request
    }

    /// The runner used to launch the tool.
    pub fn runner(&self) -> &ProcessRunner<S> {
        &self.runner
    }

    /// Check every precondition and resolve the sign tool.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for the first unusable input: identity,
    /// sign tool, timestamp servers, file list, then each file.
    pub fn validate(&self) -> SignResult<PathBuf> {
        if self.request.identity().is_none() {
            return Err(CoreError::Config(
                "No usable signing identity: set a SHA1 thumbprint or an existing PFX file"
                    .to_owned(),
            )
            .into());
        }

        let executable = resolve_executable_path(self.sign_tool.as_deref(), &self.search_list)
            .ok_or_else(|| {
                CoreError::ExecutableNotFound(self.sign_tool.as_ref().map_or_else(
                    || SIGN_TOOL_FILE_NAME.to_owned(),
                    |path| path.display().to_string(),
                ))
            })?;

        if self.request.timestamp_servers.is_empty() {
            return Err(
                CoreError::Config("Timestamp servers have not been specified.".to_owned()).into(),
            );
        }

        if self.request.files.is_empty() {
            return Err(CoreError::Config("Number of files to sign is zero.".to_owned()).into());
        }

        if let Some(missing) = self.request.files.iter().find(|file| !file.is_file()) {
            return Err(CoreError::Config(format!(
                "File to sign does not exist: {}",
                missing.display()
            ))
            .into());
        }

        Ok(executable)
    }

    /// Validate, sign and log the final outcome.
    ///
    /// # Errors
    ///
    /// Returns a `SignError` when validation fails or the tool cannot be run.
    /// A failed signing is not an error; it is reported in the `SignReport`.
    pub async fn run(&self, reporter: &dyn Reporter) -> SignResult<SignReport> {
        let executable = self.validate()?;
        let working_directory = match &self.working_directory {
            Some(directory) => directory.clone(),
            None => env::current_dir().map_err(CoreError::from)?,
        };

        let file_count = self.request.files.len();
        reporter.info(&format!("Number of files to sign: {file_count}"));

        let report = RetryOrchestrator::new(&self.runner, &executable, &working_directory)
            .continue_on_failure(self.continue_on_failure)
            .sign(&self.request, reporter)
            .await?;

        match report.outcome {
            SignOutcome::Success => reporter.info(&format!("Signed {file_count} file(s)")),
            SignOutcome::TransientTimestampFailure => report_or_continue(
                reporter,
                &format!(
                    "Signing failed: none of the {} timestamp servers could be reached",
                    report.attempts.len()
                ),
                self.continue_on_failure,
            ),
            SignOutcome::Failed => {
                report_or_continue(reporter, "Signing failed", self.continue_on_failure);
            }
        }
        Ok(report)
    }

    /// Run the task and return the build's pass/fail signal.
    ///
    /// Never fails the host: every error is logged, and with
    /// `continue_on_failure` the task always passes.
    pub async fn execute(&self, reporter: &dyn Reporter) -> bool {
        match self.run(reporter).await {
            Ok(report) => report.outcome.is_success() || self.continue_on_failure,
            Err(error) => {
                let redactor = SecretRedactor::new(self.request.secret());
                report_or_continue(
                    reporter,
                    &redactor.redact(&error.to_string()),
                    self.continue_on_failure,
                );
                self.continue_on_failure
            }
        }
    }
}
