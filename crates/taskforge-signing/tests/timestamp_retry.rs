//! Signing runs across several timestamp servers.
#![cfg_attr(
    test,
    allow(
        clippy::tests_outside_test_module,
        clippy::missing_panics_doc,
        clippy::unwrap_used,
        reason = "Test file allows"
    )
)]

use std::fs;
use std::path::PathBuf;

use taskforge_core::{RecordingReporter, Severity, SignConfig, SignOutcome};
use taskforge_signing::SignTask;
use taskforge_tooling::encode_argument;
use taskforge_tooling::testing::{ScriptedRun, ScriptedSpawner};
use tempfile::TempDir;

const UNREACHABLE: &str =
    "SignTool Error: The specified timestamp server either could not be reached or returned an invalid response.\n";

fn workspace() -> (TempDir, SignConfig) {
    let dir = TempDir::new().unwrap();
    let tool = dir.path().join("signtool.exe");
    let pfx = dir.path().join("release.pfx");
    let installer = dir.path().join("Setup Installer.msi");
    fs::write(&tool, b"").unwrap();
    fs::write(&pfx, b"pfx").unwrap();
    fs::write(&installer, b"msi").unwrap();

    let config = SignConfig {
        files: vec![installer],
        timestamp_servers: vec![
            "http://timestamp.one".to_owned(),
            "http://timestamp.two".to_owned(),
            "http://timestamp.three".to_owned(),
        ],
        pfx_file: Some(pfx),
        pfx_password: Some("Sup3rSecret".to_owned()),
        description: Some("Product Setup".to_owned()),
        sign_tool_executable: Some(tool),
        ..SignConfig::default()
    };
    (dir, config)
}

fn task(dir: &TempDir, config: &SignConfig, runs: Vec<ScriptedRun>) -> SignTask<ScriptedSpawner> {
    SignTask::new(config, ScriptedSpawner::new(runs))
        .with_search_list(Vec::<PathBuf>::new())
        .with_working_directory(dir.path())
}

#[tokio::test]
async fn test_second_server_succeeds_after_transient_failure() {
    let (dir, config) = workspace();
    let task = task(
        &dir,
        &config,
        vec![
            ScriptedRun::exit(1).with_stderr(UNREACHABLE),
            ScriptedRun::exit(0).with_stdout("Number of files successfully Signed: 1\n"),
        ],
    );
    let reporter = RecordingReporter::new();

    let report = task.run(&reporter).await.unwrap();

    assert_eq!(report.outcome, SignOutcome::Success);
    let servers: Vec<_> = report.attempts.iter().map(|attempt| attempt.server.as_str()).collect();
    assert_eq!(servers, vec!["http://timestamp.one", "http://timestamp.two"]);
    assert_eq!(task.runner().spawner().invocations().len(), 2);
    assert_eq!(
        reporter
            .messages(Severity::Info)
            .iter()
            .filter(|message| message.starts_with("Starting process:"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_password_never_reaches_the_log() {
    let (dir, config) = workspace();
    let task = task(
        &dir,
        &config,
        vec![ScriptedRun::exit(1).with_stderr("SignTool Error: password Sup3rSecret rejected\n")],
    );
    let reporter = RecordingReporter::new();

    assert!(!task.execute(&reporter).await);

    let invocation = &task.runner().spawner().invocations()[0];
    assert!(invocation.argument_line.contains("/p Sup3rSecret"));
    assert!(!reporter.contains("Sup3rSecret"));
    assert!(reporter.contains("/p ***********"));
    assert!(reporter.contains("SignTool Error: password *********** rejected"));
}

#[tokio::test]
async fn test_password_with_quote_never_reaches_the_log() {
    let (dir, mut config) = workspace();
    config.pfx_password = Some("Se\"cret".to_owned());
    let task = task(
        &dir,
        &config,
        vec![ScriptedRun::exit(1).with_stderr("SignTool Error: password Se\"cret rejected\n")],
    );
    let reporter = RecordingReporter::new();

    assert!(!task.execute(&reporter).await);

    let invocation = &task.runner().spawner().invocations()[0];
    assert!(invocation.argument_line.contains("/p Se\\\"cret"));
    assert!(!reporter.contains("Se\\\"cret"));
    assert!(!reporter.contains("Se\"cret"));
    assert!(reporter.contains("/p ********"));
    assert!(reporter.contains("SignTool Error: password ******* rejected"));
}

#[tokio::test]
async fn test_argument_line_grammar() {
    let (dir, config) = workspace();
    let task = task(&dir, &config, vec![ScriptedRun::exit(0)]);
    let reporter = RecordingReporter::new();

    assert!(task.execute(&reporter).await);

    let line = &task.runner().spawner().invocations()[0].argument_line;
    let pfx = config.pfx_file.as_ref().unwrap().to_string_lossy().into_owned();
    let installer = config.files[0].to_string_lossy().into_owned();
    assert_eq!(
        *line,
        format!(
            "sign /f {} /p Sup3rSecret /t http://timestamp.one /d \"Product Setup\" {}",
            encode_argument(&pfx),
            encode_argument(&installer)
        )
    );
}

#[tokio::test]
async fn test_all_servers_unreachable() {
    let (dir, config) = workspace();
    let task = task(
        &dir,
        &config,
        vec![
            ScriptedRun::exit(1).with_stderr(UNREACHABLE),
            ScriptedRun::exit(1).with_stderr(UNREACHABLE),
            ScriptedRun::exit(1).with_stderr(UNREACHABLE),
        ],
    );
    let reporter = RecordingReporter::new();

    assert!(!task.execute(&reporter).await);
    assert_eq!(task.runner().spawner().invocations().len(), 3);
    assert!(reporter.contains("none of the 3 timestamp servers could be reached"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_fake_sign_tool_process() {
    use std::os::unix::fs::PermissionsExt as _;

    let (dir, mut config) = workspace();
    let script = dir.path().join("fake-signtool.sh");
    fs::write(
        &script,
        "#!/bin/sh\n\
         for arg in \"$@\"; do echo \"arg: $arg\"; done\n\
         case \"$*\" in\n\
         *\"/t http://timestamp.one\"*) echo \"SignTool Error: The specified timestamp server could not be reached.\" >&2; exit 1;;\n\
         esac\n\
         exit 0\n",
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    config.sign_tool_executable = Some(script);

    let task = SignTask::new(&config, taskforge_tooling::SystemSpawner)
        .with_search_list(Vec::new())
        .with_working_directory(dir.path());
    let reporter = RecordingReporter::new();

    let report = task.run(&reporter).await.unwrap();

    assert_eq!(report.outcome, SignOutcome::Success);
    assert_eq!(report.attempts.len(), 2);
    assert_eq!(report.attempts[0].exit_code, 1);
    assert!(reporter.contains("arg: Product Setup"));
    assert!(reporter.contains("arg: ***********"));
    assert!(!reporter.contains("Sup3rSecret"));
}
